//! Load state of the remote availability view.

use std::future::Future;
use garage_common::log_error;

use crate::error::BookingError;

pub const SLOTS_LOAD_FAILED: &str = "Failed to load available slots. Please try again.";
pub const DATES_LOAD_FAILED: &str = "Failed to load available dates. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AvailabilityState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// Holds the static message shown in place of the picker.
    Failed(String),
}

impl<T> AvailabilityState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AvailabilityState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AvailabilityState::Ready(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AvailabilityState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            AvailabilityState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AvailabilityState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Runs one fetch, passing through `Loading`. A failure is logged and
    /// replaced by `failure_message`; no retry.
    pub async fn load<F>(&mut self, fetch: F, failure_message: &str)
    where
        F: Future<Output = Result<T, BookingError>>,
    {
        *self = AvailabilityState::Loading;
        *self = match fetch.await {
            Ok(data) => AvailabilityState::Ready(data),
            Err(e) => {
                log_error(&e, "Availability fetch failed");
                AvailabilityState::Failed(failure_message.to_string())
            }
        };
    }
}
