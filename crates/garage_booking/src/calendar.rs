// --- File: crates/garage_booking/src/calendar.rs ---
//! Single-page booking form with an inline month calendar.

use chrono::{Datelike, Days, Months, NaiveDate};
use chrono_tz::Tz;
use garage_common::UserMessage;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::availability::{AvailabilityState, DATES_LOAD_FAILED};
use crate::clock::Clock;
use crate::error::BookingError;
use crate::models::{BookingDraft, BookingSubmissionResult, DraftField, SessionBooking, UnavailableDates};
use crate::rules::CalendarRules;
use crate::service::BookingBackend;
use crate::submission::{calendar_payload, DATE_NO_LONGER_AVAILABLE};

/// One square of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading and trailing days of adjacent months.
    pub in_month: bool,
    pub selectable: bool,
    pub selected: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// First day of the shown month.
    pub month: NaiveDate,
    /// Sunday-first weeks.
    pub weeks: Vec<[DayCell; 7]>,
}

impl MonthGrid {
    pub fn title(&self) -> String {
        self.month.format("%B %Y").to_string()
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub struct CalendarFlow {
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    rules: CalendarRules,
    time_zone: Tz,
    draft: BookingDraft,
    availability: AvailabilityState<UnavailableDates>,
    visible_month: NaiveDate,
    submitting: bool,
    submission_error: Option<String>,
    bookings: Vec<SessionBooking>,
}

impl CalendarFlow {
    pub fn new(
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
        rules: CalendarRules,
        time_zone: Tz,
    ) -> Self {
        let visible_month = first_of_month(clock.today());
        Self {
            backend,
            clock,
            rules,
            time_zone,
            draft: BookingDraft::with_free_text_registration(),
            availability: AvailabilityState::Idle,
            visible_month,
            submitting: false,
            submission_error: None,
            bookings: Vec::new(),
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    pub fn availability(&self) -> &AvailabilityState<UnavailableDates> {
        &self.availability
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn session_bookings(&self) -> &[SessionBooking] {
        &self.bookings
    }

    pub fn visible_month(&self) -> NaiveDate {
        self.visible_month
    }

    /// Fetches the unavailable dates. Called when the view opens and on refresh.
    pub async fn load(&mut self) {
        self.availability
            .load(self.backend.fetch_unavailable_dates(), DATES_LOAD_FAILED)
            .await;
    }

    pub fn edit(&mut self, field: DraftField, value: &str) {
        self.draft.set_field(field, value);
    }

    /// False while availability is not loaded.
    pub fn is_date_selectable(&self, date: NaiveDate) -> bool {
        match self.availability.data() {
            Some(unavailable) => self
                .rules
                .is_date_selectable(date, self.clock.today(), unavailable),
            None => false,
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        let unavailable = self
            .availability
            .data()
            .ok_or(BookingError::AvailabilityNotLoaded)?;
        self.rules
            .check_date(date, self.clock.today(), unavailable)
            .map_err(|reason| BookingError::DateUnavailable { date, reason })?;
        debug!("Selected date {}", date);
        self.draft.date = Some(date);
        Ok(())
    }

    pub fn next_month(&mut self) -> NaiveDate {
        if let Some(next) = self.visible_month.checked_add_months(Months::new(1)) {
            self.visible_month = next;
        }
        self.visible_month
    }

    /// Refuses to move before the current month.
    pub fn prev_month(&mut self) -> Result<NaiveDate, BookingError> {
        let current = first_of_month(self.clock.today());
        match self.visible_month.checked_sub_months(Months::new(1)) {
            Some(prev) if prev >= current => {
                self.visible_month = prev;
                Ok(prev)
            }
            _ => Err(BookingError::InvalidState("already at the current month")),
        }
    }

    pub fn month_grid(&self) -> MonthGrid {
        let today = self.clock.today();
        let month = self.visible_month;
        let lead = u64::from(month.weekday().num_days_from_sunday());
        let start = month.checked_sub_days(Days::new(lead)).unwrap_or(month);
        let next_month = month.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);

        let mut weeks = Vec::new();
        let mut week_start = start;
        while week_start < next_month {
            let week: [DayCell; 7] = std::array::from_fn(|offset| {
                let date = week_start
                    .checked_add_days(Days::new(offset as u64))
                    .unwrap_or(NaiveDate::MAX);
                DayCell {
                    date,
                    in_month: first_of_month(date) == month,
                    selectable: self.is_date_selectable(date),
                    selected: self.draft.date == Some(date),
                    is_today: date == today,
                }
            });
            weeks.push(week);
            match week_start.checked_add_days(Days::new(7)) {
                Some(next) => week_start = next,
                None => break,
            }
        }
        MonthGrid { month, weeks }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = self.draft.missing_personal_info();
        if self.draft.service.trim().is_empty() {
            missing.push("service");
        }
        if self.draft.date.is_none() {
            missing.push("date");
        }
        missing
    }

    /// Re-validates the date, posts once, and clears the form on success.
    pub async fn submit(&mut self) -> BookingSubmissionResult {
        self.submission_error = None;
        match self.try_submit().await {
            Ok(booking) => {
                let result = BookingSubmissionResult::Accepted {
                    local_id: booking.local_id,
                    remote_id: booking.remote_id.clone(),
                };
                self.bookings.push(booking);
                self.draft = BookingDraft::with_free_text_registration();
                result
            }
            Err(e) => {
                let message = match &e {
                    BookingError::AvailabilityNotLoaded => DATE_NO_LONGER_AVAILABLE.to_string(),
                    _ => e.user_message(),
                };
                if e.is_local() {
                    info!("Booking rejected locally: {}", e);
                } else {
                    error!("Booking submission failed: {}", e);
                }
                self.submission_error = Some(message.clone());
                BookingSubmissionResult::Failed { message }
            }
        }
    }

    async fn try_submit(&mut self) -> Result<SessionBooking, BookingError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing));
        }
        let date = self.draft.date.ok_or(BookingError::MissingFields(vec!["date"]))?;
        let unavailable = self
            .availability
            .data()
            .ok_or(BookingError::AvailabilityNotLoaded)?;
        self.rules
            .check_date(date, self.clock.today(), unavailable)
            .map_err(|reason| BookingError::DateUnavailable { date, reason })?;

        let payload = calendar_payload(&self.draft, self.clock.now(), self.time_zone)?;
        self.submitting = true;
        let receipt = self.backend.submit_booking(&payload).await;
        self.submitting = false;
        let receipt = receipt?;

        let booking = SessionBooking {
            local_id: Uuid::new_v4(),
            remote_id: receipt.remote_id,
            payload,
        };
        info!("Booking {} submitted for {}", booking.local_id, date);
        Ok(booking)
    }
}
