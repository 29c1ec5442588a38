//! Command implementations for the `garage-booking` CLI.
//!
//! Each submodule corresponds to a top-level CLI command.

/// Interactive booking, `garage-booking book`.
pub mod book;

/// Cancellation from an email link, `garage-booking cancel <link>`.
pub mod cancel;

/// `garage-booking config`
pub mod show_config;

/// Read-only availability listing, `garage-booking slots`.
pub mod slots;
