// --- File: crates/garage_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities


// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, validation_error, Context, GarageError, UserMessage,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, get, post, HTTP_CLIENT},
    ensure_success,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, level_from_str, log_error, log_result};
