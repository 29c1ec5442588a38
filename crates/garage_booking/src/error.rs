// --- File: crates/garage_booking/src/error.rs ---
use chrono::NaiveDate;
use garage_common::{external_service_error, GarageError, UserMessage};
use thiserror::Error;

use crate::rules::Ineligible;
use crate::submission::{DATE_NO_LONGER_AVAILABLE, SLOT_NO_LONGER_AVAILABLE, SUBMIT_FAILED};

/// Errors raised by the booking flows and the webhook client.
#[derive(Error, Debug)]
pub enum BookingError {
    /// Transport failure talking to a webhook
    #[error("Booking webhook request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// A webhook answered with a non-2xx status
    #[error("{endpoint} webhook returned status {status}")]
    Rejected { endpoint: &'static str, status: u16 },

    /// A webhook reply could not be parsed
    #[error("Failed to parse webhook response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{date} cannot be booked: {reason}")]
    DateUnavailable { date: NaiveDate, reason: Ineligible },

    #[error("{date} {time} cannot be booked: {reason}")]
    SlotUnavailable {
        date: NaiveDate,
        time: String,
        reason: Ineligible,
    },

    #[error("Availability has not been loaded")]
    AvailabilityNotLoaded,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Not possible at this point: {0}")]
    InvalidState(&'static str),

    #[error("Invalid booking configuration: {0}")]
    ConfigError(String),
}

impl BookingError {
    /// True for failures that never reached the network.
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            BookingError::RequestError(_)
                | BookingError::Rejected { .. }
                | BookingError::ParseError(_)
        )
    }
}

/// Static text for a failed submit.
impl UserMessage for BookingError {
    fn user_message(&self) -> String {
        match self {
            BookingError::RequestError(_)
            | BookingError::Rejected { .. }
            | BookingError::ParseError(_)
            | BookingError::InvalidTime(_) => SUBMIT_FAILED.to_string(),
            BookingError::SlotUnavailable { .. } => SLOT_NO_LONGER_AVAILABLE.to_string(),
            BookingError::DateUnavailable { .. } => DATE_NO_LONGER_AVAILABLE.to_string(),
            BookingError::ConfigError(_) => {
                "The booking service is not configured correctly.".to_string()
            }
            BookingError::MissingFields(_)
            | BookingError::AvailabilityNotLoaded
            | BookingError::InvalidState(_) => self.to_string(),
        }
    }
}

/// Convert BookingError to GarageError
impl From<BookingError> for GarageError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::RequestError(e) => {
                GarageError::HttpError(format!("Booking webhook request error: {}", e))
            }
            BookingError::Rejected { endpoint, status } => {
                external_service_error(endpoint, format!("Status: {}", status))
            }
            BookingError::ParseError(e) => {
                GarageError::ParseError(format!("Webhook response parse error: {}", e))
            }
            BookingError::ConfigError(msg) => GarageError::ConfigError(msg),
            BookingError::InvalidTime(msg) => {
                GarageError::InternalError(format!("Invalid appointment time: {}", msg))
            }
            other => GarageError::ValidationError(other.to_string()),
        }
    }
}
