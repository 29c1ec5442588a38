// --- File: crates/garage_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for the garage booking client.
///
/// Each crate keeps its own error enum and converts into this one with
/// `From<SpecificError> for GarageError`.
#[derive(Error, Debug)]
pub enum GarageError {
    /// Transport failure while talking to a remote endpoint
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// A response body could not be parsed
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Local validation failed (missing field, ineligible date or slot)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A remote service answered with a non-success status
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Converts an error into the static text shown to the user.
///
/// All failures end at the UI boundary as one of these messages; none are
/// retried automatically.
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for GarageError {
    fn user_message(&self) -> String {
        match self {
            GarageError::ValidationError(message) => message.clone(),
            GarageError::ConfigError(_) => {
                "The booking service is not configured correctly.".to_string()
            }
            GarageError::HttpError(_)
            | GarageError::ParseError(_)
            | GarageError::ExternalServiceError { .. }
            | GarageError::InternalError(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Turns any foreign error into [`GarageError::InternalError`], prefixed
/// with what was being attempted.
pub trait Context<T> {
    fn context(self, action: &str) -> Result<T, GarageError>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T> for Result<T, E> {
    fn context(self, action: &str) -> Result<T, GarageError> {
        self.map_err(|error| GarageError::InternalError(format!("{action}: {error}")))
    }
}

impl From<serde_json::Error> for GarageError {
    fn from(err: serde_json::Error) -> Self {
        GarageError::ParseError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> GarageError {
    GarageError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> GarageError {
    GarageError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> GarageError {
    GarageError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
