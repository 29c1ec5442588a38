// --- File: crates/garage_booking/src/cancel.rs ---
//! Cancellation of a booking from the link in the confirmation email.

use reqwest::Url;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::service::BookingBackend;

/// Query parameter carrying the booking identifier.
pub const BOOKING_ID_PARAM: &str = "bookingId";

pub const CANCEL_FAILED: &str = "Failed to cancel booking. Please try again.";
pub const INVALID_BOOKING: &str = "Invalid Booking";

/// Restores the `+` of a UTC offset that form decoding turned into a space.
/// Only the first occurrence is rewritten.
pub fn repair_booking_id(raw: &str) -> String {
    raw.replacen(" 00:00", "+00:00", 1)
}

fn first_booking_id<I>(pairs: I) -> Option<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .find(|(key, _)| key == BOOKING_ID_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .map(|value| repair_booking_id(&value))
}

/// Reads `bookingId` from a raw query string, with or without the leading `?`.
pub fn booking_id_from_query(query: &str) -> Option<String> {
    let query = query.trim().trim_start_matches('?');
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => first_booking_id(pairs),
        Err(e) => {
            warn!("Unreadable cancellation query '{}': {}", query, e);
            None
        }
    }
}

/// Reads `bookingId` from a full cancellation link.
pub fn booking_id_from_url(url: &Url) -> Option<String> {
    first_booking_id(url.query_pairs().into_owned())
}

/// Accepts either a full link or a bare query string.
pub fn booking_id_from_input(input: &str) -> Option<String> {
    match Url::parse(input.trim()) {
        Ok(url) => booking_id_from_url(&url),
        Err(_) => booking_id_from_query(input),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationState {
    /// The link carried no identifier.
    NoBooking,
    /// Waiting for the user to confirm.
    Ready,
    Cancelling,
    Cancelled,
    /// The request failed; the user may try again.
    Failed(String),
}

pub struct CancellationView {
    backend: Arc<dyn BookingBackend>,
    booking_id: Option<String>,
    state: CancellationState,
}

impl CancellationView {
    pub fn new(backend: Arc<dyn BookingBackend>, booking_id: Option<String>) -> Self {
        let state = match booking_id {
            Some(_) => CancellationState::Ready,
            None => CancellationState::NoBooking,
        };
        Self {
            backend,
            booking_id,
            state,
        }
    }

    pub fn from_query(backend: Arc<dyn BookingBackend>, query: &str) -> Self {
        Self::new(backend, booking_id_from_query(query))
    }

    pub fn from_input(backend: Arc<dyn BookingBackend>, input: &str) -> Self {
        Self::new(backend, booking_id_from_input(input))
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.booking_id.as_deref()
    }

    pub fn state(&self) -> &CancellationState {
        &self.state
    }

    /// Posts the cancellation once. Without an identifier, or after a
    /// successful cancel, nothing is sent.
    pub async fn cancel(&mut self) -> &CancellationState {
        let Some(booking_id) = self.booking_id.clone() else {
            warn!("Cancel requested without a booking id");
            return &self.state;
        };
        if matches!(
            self.state,
            CancellationState::Cancelled | CancellationState::Cancelling
        ) {
            return &self.state;
        }

        self.state = CancellationState::Cancelling;
        self.state = match self.backend.cancel_booking(&booking_id).await {
            Ok(receipt) => {
                info!(
                    "Booking {} cancelled, service received {:?}",
                    booking_id, receipt.echoed_booking_id
                );
                CancellationState::Cancelled
            }
            Err(e) => {
                error!("Cancelling booking {} failed: {}", booking_id, e);
                CancellationState::Failed(CANCEL_FAILED.to_string())
            }
        };
        &self.state
    }

    pub fn headline(&self) -> &'static str {
        match self.state {
            CancellationState::NoBooking => INVALID_BOOKING,
            CancellationState::Cancelled => "Booking Cancelled",
            _ => "Cancel Booking",
        }
    }

    pub fn message(&self) -> &str {
        match &self.state {
            CancellationState::NoBooking => {
                "No booking ID provided. Please use the link from your booking confirmation email."
            }
            CancellationState::Ready | CancellationState::Cancelling => {
                "Are you sure you want to cancel this booking? This action cannot be undone."
            }
            CancellationState::Cancelled => "Your booking has been successfully cancelled.",
            CancellationState::Failed(message) => message,
        }
    }
}
