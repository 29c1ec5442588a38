// --- File: crates/garage_booking/src/submission.rs ---
//! Builds the webhook payload from a validated draft.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::BookingError;
use crate::models::{BookingDraft, BookingPayload};

pub const SUBMIT_FAILED: &str = "Failed to submit booking. Please try again.";
pub const SLOT_NO_LONGER_AVAILABLE: &str =
    "The selected time slot is no longer available. Please choose another.";
pub const DATE_NO_LONGER_AVAILABLE: &str =
    "The selected date is no longer available. Please choose another.";

/// Status sent with calendar-form bookings.
pub const PENDING_STATUS: &str = "pending";

/// Start and end (+1 hour) of the appointment, as UTC instants.
///
/// `label` is the slot's local civil time ("09:00") in `tz`. On a DST fold
/// the earlier instant is used; a label inside a DST gap is rejected.
pub fn appointment_window(
    date: NaiveDate,
    label: &str,
    tz: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
    let time = NaiveTime::parse_from_str(label.trim(), "%H:%M")
        .map_err(|_| BookingError::InvalidTime(format!("bad slot label '{label}'")))?;
    let local = date.and_time(time);
    let start = tz
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| BookingError::InvalidTime(format!("{local} does not exist in {tz}")))?
        .with_timezone(&Utc);
    Ok((start, start + Duration::hours(1)))
}

/// `2025-06-10T08:00:00.000Z`
pub fn to_interchange(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Submission timestamp in local civil time, `YYYY-MM-DD HH:mm:ss`.
pub fn created_at(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn base_payload(draft: &BookingDraft, date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> BookingPayload {
    BookingPayload {
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        reg: draft.registration.composed(),
        make: draft.make.clone(),
        model: draft.model.clone(),
        start_date: None,
        end_date: None,
        booking_date: date.format("%Y-%m-%d").to_string(),
        created_at: created_at(now, tz),
        service: draft.service.clone(),
        notes: draft.notes.clone(),
        status: None,
    }
}

/// Payload for the stepper form: carries the start/end instants.
pub fn stepper_payload(
    draft: &BookingDraft,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<BookingPayload, BookingError> {
    let date = draft.date.ok_or(BookingError::MissingFields(vec!["date"]))?;
    let time = draft
        .time
        .as_deref()
        .ok_or(BookingError::MissingFields(vec!["time"]))?;
    let (start, end) = appointment_window(date, time, tz)?;
    Ok(BookingPayload {
        start_date: Some(to_interchange(start)),
        end_date: Some(to_interchange(end)),
        ..base_payload(draft, date, now, tz)
    })
}

/// Payload for the calendar form: date only, marked pending.
pub fn calendar_payload(
    draft: &BookingDraft,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<BookingPayload, BookingError> {
    let date = draft.date.ok_or(BookingError::MissingFields(vec!["date"]))?;
    Ok(BookingPayload {
        status: Some(PENDING_STATUS.to_string()),
        ..base_payload(draft, date, now, tz)
    })
}
