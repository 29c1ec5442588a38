// --- File: crates/garage_booking/src/service.rs ---
//! Client for the booking webhooks.
//!
//! The flows only see the [`BookingBackend`] trait; [`WebhookBookingService`]
//! is the implementation that talks to the n8n endpoints.

use async_trait::async_trait;
use chrono::NaiveDate;
use garage_common::{create_client, ensure_success, get, post};
use garage_config::EndpointsConfig;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::BookingError;
use crate::models::{
    BookingPayload, BookingReceipt, CancelRequest, CancellationReceipt, OccupancyMap,
    UnavailableDates,
};

/// Remote operations used by the booking and cancellation flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Existing bookings per date and hour (stepper form).
    async fn fetch_slot_occupancy(&self) -> Result<OccupancyMap, BookingError>;

    /// Dates that cannot be booked at all (calendar form).
    async fn fetch_unavailable_dates(&self) -> Result<UnavailableDates, BookingError>;

    /// Posts one booking. No retry.
    async fn submit_booking(&self, payload: &BookingPayload)
        -> Result<BookingReceipt, BookingError>;

    /// Posts one cancellation. No retry.
    async fn cancel_booking(&self, booking_id: &str) -> Result<CancellationReceipt, BookingError>;
}

/// `[{"2025-06-10": {"09": 1}}, ...]`. A `null` day carries no bookings.
pub type OccupancyWire = Vec<BTreeMap<String, Option<BTreeMap<String, u32>>>>;

#[derive(Debug, Deserialize)]
struct UnavailableDatesWire {
    #[serde(default)]
    dates: Vec<String>,
}

/// [`BookingBackend`] over the configured webhook URLs.
#[derive(Debug, Clone)]
pub struct WebhookBookingService {
    client: Client,
    endpoints: EndpointsConfig,
}

impl WebhookBookingService {
    pub fn new(endpoints: EndpointsConfig) -> Result<Self, BookingError> {
        let client = create_client(endpoints.request_timeout_secs.map(Duration::from_secs))?;
        Ok(Self::with_client(client, endpoints))
    }

    pub fn with_client(client: Client, endpoints: EndpointsConfig) -> Self {
        Self { client, endpoints }
    }

    fn checked(
        endpoint: &'static str,
        result: Result<Response, reqwest::Error>,
    ) -> Result<Response, BookingError> {
        let response = result.map_err(|e| {
            error!("{} webhook request failed: {}", endpoint, e);
            BookingError::RequestError(e)
        })?;
        ensure_success(response).map_err(|status| {
            error!("{} webhook returned status {}", endpoint, status);
            BookingError::Rejected {
                endpoint,
                status: status.as_u16(),
            }
        })
    }
}

#[async_trait]
impl BookingBackend for WebhookBookingService {
    async fn fetch_slot_occupancy(&self) -> Result<OccupancyMap, BookingError> {
        info!("Fetching slot occupancy");
        let response = Self::checked(
            "availability",
            get(&self.client, &self.endpoints.availability_url).await,
        )?;
        let wire: OccupancyWire = response.json().await?;
        let occupancy = parse_occupancy(wire);
        info!("Loaded occupancy for {} date(s)", occupancy.len());
        Ok(occupancy)
    }

    async fn fetch_unavailable_dates(&self) -> Result<UnavailableDates, BookingError> {
        info!("Fetching unavailable dates");
        let response = Self::checked(
            "unavailable dates",
            get(&self.client, &self.endpoints.unavailable_dates_url).await,
        )?;
        let wire: UnavailableDatesWire = response.json().await?;
        let dates = parse_unavailable_dates(&wire.dates);
        info!("Loaded {} unavailable date(s)", dates.len());
        Ok(dates)
    }

    async fn submit_booking(
        &self,
        payload: &BookingPayload,
    ) -> Result<BookingReceipt, BookingError> {
        info!(
            "Submitting booking for {} on {}",
            payload.reg, payload.booking_date
        );
        let response = Self::checked(
            "booking",
            post(&self.client, &self.endpoints.booking_url, payload).await,
        )?;
        let body = lenient_body(response).await?;
        let remote_id = remote_booking_id(&body);
        info!("Booking accepted, remote id: {:?}", remote_id);
        Ok(BookingReceipt { remote_id, body })
    }

    async fn cancel_booking(&self, booking_id: &str) -> Result<CancellationReceipt, BookingError> {
        info!("Cancelling booking {}", booking_id);
        let request = CancelRequest {
            booking_id: booking_id.to_string(),
        };
        let response = Self::checked(
            "cancellation",
            post(&self.client, &self.endpoints.cancel_url, &request).await,
        )?;
        let body = lenient_body(response).await?;
        let echoed_booking_id = remote_booking_id(&body);
        info!("Booking {} cancelled", booking_id);
        Ok(CancellationReceipt {
            echoed_booking_id,
            body,
        })
    }
}

/// Flattens the webhook list into one map. Later entries for the same date
/// replace earlier ones; keys that are not dates are skipped.
pub fn parse_occupancy(wire: OccupancyWire) -> OccupancyMap {
    let mut occupancy = OccupancyMap::new();
    for item in wire {
        for (day, hours) in item {
            let Some(hours) = hours else {
                debug!("No occupancy recorded for '{}'", day);
                continue;
            };
            match NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d") {
                Ok(date) => occupancy.insert_date(date, hours),
                Err(_) => warn!("Skipping occupancy entry with bad date '{}'", day),
            }
        }
    }
    occupancy
}

/// Reads the calendar day of each entry, accepting full timestamps.
pub fn parse_unavailable_dates(raw: &[String]) -> UnavailableDates {
    raw.iter()
        .filter_map(|entry| {
            let day = entry.trim().get(..10).unwrap_or(entry.trim());
            match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    warn!("Skipping unavailable date '{}'", entry);
                    None
                }
            }
        })
        .collect()
}

/// A 2xx reply with an empty or non-JSON body still counts as success.
async fn lenient_body(response: Response) -> Result<Value, BookingError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Looks for an identifier under `id`, `bookingId` or `booking_id`. n8n
/// often wraps replies in a one-element array.
pub fn remote_booking_id(body: &Value) -> Option<String> {
    let object = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };
    ["id", "bookingId", "booking_id"]
        .iter()
        .find_map(|key| match object.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
