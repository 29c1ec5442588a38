//! Logging utilities for the garage booking client.
//!
//! Every crate logs through `tracing`; this module sets up the subscriber
//! once per process.

use std::str::FromStr;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// `RUST_LOG` is honoured on top of the default directive.
///
/// # Examples
///
/// ```
/// use garage_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// The level applies to every `garage*` target. Calling this twice is
/// harmless, the second call is ignored.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = Directive::from_str(&format!("garage={}", level)) {
        filter = filter.add_directive(directive);
    }

    // stdout belongs to the prompts. A global subscriber may already be set
    // (tests, embedding), hence try_init.
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Parses a level name from configuration ("debug", "WARN", ...).
///
/// Unknown names fall back to INFO.
pub fn level_from_str(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}
