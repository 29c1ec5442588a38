// --- File: crates/garage_booking/src/models.rs ---
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::registration::Registration;

/// Normalizes a slot label or webhook key to its two-digit hour ("09:00" -> "09").
pub fn hour_key(label: &str) -> String {
    let hour = label.trim().split(':').next().unwrap_or_default();
    match hour.parse::<u32>() {
        Ok(h) => format!("{:02}", h),
        Err(_) => hour.to_string(),
    }
}

// --- Booking Draft ---

/// Editable fields of a draft, one per input of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Email,
    Phone,
    /// Free-text registration (calendar form).
    Registration,
    RegistrationPart1,
    RegistrationPart2,
    RegistrationPart3,
    Make,
    Model,
    Service,
    Notes,
}

/// The booking being edited. One per flow instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registration: Registration,
    pub make: String,
    pub model: String,
    pub date: Option<NaiveDate>,
    /// Slot label, stepper only.
    pub time: Option<String>,
    pub service: String,
    pub notes: String,
}

impl BookingDraft {
    /// An empty draft with a single free-text registration field.
    pub fn with_free_text_registration() -> Self {
        Self {
            registration: Registration::free_text(),
            ..Default::default()
        }
    }

    /// Applies one input event. Registration edits that do not match the
    /// draft's registration shape are ignored.
    pub fn set_field(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Name => self.name = value.to_string(),
            DraftField::Email => self.email = value.to_string(),
            DraftField::Phone => self.phone = value.to_string(),
            DraftField::Make => self.make = value.to_string(),
            DraftField::Model => self.model = value.to_string(),
            DraftField::Service => self.service = value.to_string(),
            DraftField::Notes => self.notes = value.to_string(),
            DraftField::Registration => {
                if let Registration::FreeText(text) = &mut self.registration {
                    *text = value.to_string();
                }
            }
            DraftField::RegistrationPart1 => {
                if let Registration::Parts(parts) = &mut self.registration {
                    parts.set_part1(value);
                }
            }
            DraftField::RegistrationPart2 => {
                if let Registration::Parts(parts) = &mut self.registration {
                    parts.set_part2(value);
                }
            }
            DraftField::RegistrationPart3 => {
                if let Registration::Parts(parts) = &mut self.registration {
                    parts.set_part3(value);
                }
            }
        }
    }

    /// Required contact and vehicle fields that are still blank.
    pub fn missing_personal_info(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing.extend(self.registration.missing());
        for (name, value) in [("make", &self.make), ("model", &self.model)] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }
}

// --- Slot Availability View ---

/// Existing bookings per date and hour key, as last fetched plus any
/// bookings made in this session. Not authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    dates: BTreeMap<NaiveDate, BTreeMap<String, u32>>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole entry for `date`. Raw keys naming the same hour
    /// ("9" and "09") are summed.
    pub fn insert_date(&mut self, date: NaiveDate, hours: BTreeMap<String, u32>) {
        let mut normalized: BTreeMap<String, u32> = BTreeMap::new();
        for (key, count) in hours {
            let total = normalized.entry(hour_key(&key)).or_insert(0);
            *total = total.saturating_add(count);
        }
        self.dates.insert(date, normalized);
    }

    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.dates.contains_key(&date)
    }

    /// Occupancy of the slot; unknown dates and hours count as zero.
    pub fn count(&self, date: NaiveDate, slot: &str) -> u32 {
        self.dates
            .get(&date)
            .and_then(|hours| hours.get(&hour_key(slot)))
            .copied()
            .unwrap_or(0)
    }

    pub fn set(&mut self, date: NaiveDate, slot: &str, count: u32) {
        self.dates
            .entry(date)
            .or_default()
            .insert(hour_key(slot), count);
    }

    /// Adds one booking to the slot and returns the new count.
    pub fn increment(&mut self, date: NaiveDate, slot: &str) -> u32 {
        let count = self
            .dates
            .entry(date)
            .or_default()
            .entry(hour_key(slot))
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Dates the server reports as fully unavailable (calendar form).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnavailableDates {
    dates: BTreeSet<NaiveDate>,
}

impl UnavailableDates {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

impl FromIterator<NaiveDate> for UnavailableDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

// --- Wire Types ---

/// JSON body posted to the booking webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub reg: String,
    pub make: String,
    pub model: String,
    /// ISO-8601 UTC start instant (stepper only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// ISO-8601 UTC end instant (stepper only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// YYYY-MM-DD
    pub booking_date: String,
    /// YYYY-MM-DD HH:mm:ss, local civil time
    pub created_at: String,
    pub service: String,
    pub notes: String,
    /// "pending" (calendar only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    /// Identifier assigned by the remote service, when it returns one.
    pub remote_id: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationReceipt {
    /// The identifier the service says it received, if echoed back.
    pub echoed_booking_id: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CancelRequest {
    #[serde(rename = "bookingId")]
    pub booking_id: String,
}

/// A booking accepted during this session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBooking {
    pub local_id: Uuid,
    pub remote_id: Option<String>,
    pub payload: BookingPayload,
}

/// Outcome of one submit action.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingSubmissionResult {
    Accepted {
        local_id: Uuid,
        remote_id: Option<String>,
    },
    Failed {
        message: String,
    },
}

impl BookingSubmissionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingSubmissionResult::Accepted { .. })
    }
}
