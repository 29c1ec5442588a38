// --- File: crates/garage_booking/src/stepper.rs ---
//! Four-step booking wizard.
//!
//! Personal Info -> Date & Time -> Service Details -> Confirmation. Entering
//! the Date & Time step always refetches slot occupancy. A successful submit
//! bumps the local occupancy count for the booked hour without refetching.

use chrono::NaiveDate;
use chrono_tz::Tz;
use garage_common::UserMessage;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::availability::{AvailabilityState, SLOTS_LOAD_FAILED};
use crate::clock::Clock;
use crate::error::BookingError;
use crate::models::{BookingDraft, BookingSubmissionResult, DraftField, OccupancyMap, SessionBooking};
use crate::rules::{Ineligible, SlotStatus, StepperRules};
use crate::service::BookingBackend;
use crate::submission::{stepper_payload, SLOT_NO_LONGER_AVAILABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    PersonalInfo,
    DateTime,
    ServiceDetails,
    Confirmation,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::PersonalInfo,
        Step::DateTime,
        Step::ServiceDetails,
        Step::Confirmation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Step::PersonalInfo => "Personal Info",
            Step::DateTime => "Date & Time",
            Step::ServiceDetails => "Service Details",
            Step::Confirmation => "Confirmation",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub struct StepperFlow {
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    rules: StepperRules,
    time_zone: Tz,
    step: Step,
    draft: BookingDraft,
    availability: AvailabilityState<OccupancyMap>,
    submitting: bool,
    submission_error: Option<String>,
    bookings: Vec<SessionBooking>,
}

impl StepperFlow {
    pub fn new(
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
        rules: StepperRules,
        time_zone: Tz,
    ) -> Self {
        Self {
            backend,
            clock,
            rules,
            time_zone,
            step: Step::PersonalInfo,
            draft: BookingDraft::default(),
            availability: AvailabilityState::Idle,
            submitting: false,
            submission_error: None,
            bookings: Vec::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn rules(&self) -> &StepperRules {
        &self.rules
    }

    pub fn availability(&self) -> &AvailabilityState<OccupancyMap> {
        &self.availability
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn edit(&mut self, field: DraftField, value: &str) {
        self.draft.set_field(field, value);
    }

    /// Fields that still block leaving the current step.
    pub fn missing_for_step(&self) -> Vec<&'static str> {
        match self.step {
            Step::PersonalInfo => self.draft.missing_personal_info(),
            Step::DateTime => {
                let mut missing = Vec::new();
                if self.draft.date.is_none() {
                    missing.push("date");
                }
                if self.draft.time.is_none() {
                    missing.push("time");
                }
                if !self.availability.is_ready() {
                    missing.push("availability");
                }
                missing
            }
            Step::ServiceDetails => {
                if self.draft.service.trim().is_empty() {
                    vec!["service"]
                } else {
                    Vec::new()
                }
            }
            Step::Confirmation => Vec::new(),
        }
    }

    pub fn can_advance(&self) -> bool {
        matches!(self.step, Step::PersonalInfo | Step::DateTime) && self.missing_for_step().is_empty()
    }

    /// Moves forward one step. Service Details is left only through
    /// [`StepperFlow::submit`].
    pub async fn next(&mut self) -> Result<Step, BookingError> {
        match self.step {
            Step::ServiceDetails => return Err(BookingError::InvalidState("submit the booking")),
            Step::Confirmation => return Err(BookingError::InvalidState("booking already confirmed")),
            _ => {}
        }
        let missing = self.missing_for_step();
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing));
        }
        self.step = match self.step {
            Step::PersonalInfo => Step::DateTime,
            _ => Step::ServiceDetails,
        };
        if self.step == Step::DateTime {
            self.refresh_availability().await;
        }
        Ok(self.step)
    }

    /// Moves back one step. Going back into Date & Time refetches.
    pub async fn back(&mut self) -> Result<Step, BookingError> {
        self.step = match self.step {
            Step::PersonalInfo => return Err(BookingError::InvalidState("already at the first step")),
            Step::Confirmation => return Err(BookingError::InvalidState("booking already confirmed")),
            Step::DateTime => Step::PersonalInfo,
            Step::ServiceDetails => Step::DateTime,
        };
        self.submission_error = None;
        if self.step == Step::DateTime {
            self.refresh_availability().await;
        }
        Ok(self.step)
    }

    /// Replaces the occupancy view with a fresh fetch.
    pub async fn refresh_availability(&mut self) {
        self.availability
            .load(self.backend.fetch_slot_occupancy(), SLOTS_LOAD_FAILED)
            .await;
    }

    pub fn is_date_selectable(&self, date: NaiveDate) -> bool {
        match self.availability.data() {
            Some(occupancy) => self.rules.is_date_selectable(date, self.today(), occupancy),
            None => false,
        }
    }

    /// Dates the picker offers; empty until availability is loaded.
    pub fn selectable_dates(&self) -> Vec<NaiveDate> {
        match self.availability.data() {
            Some(occupancy) => self.rules.selectable_dates(self.today(), occupancy),
            None => Vec::new(),
        }
    }

    /// Hour buttons for the selected date.
    pub fn time_slots(&self) -> Vec<SlotStatus> {
        match (self.draft.date, self.availability.data()) {
            (Some(date), Some(occupancy)) => self.rules.slot_statuses(date, occupancy),
            _ => Vec::new(),
        }
    }

    /// Picks a date and clears any picked time.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        let occupancy = self
            .availability
            .data()
            .ok_or(BookingError::AvailabilityNotLoaded)?;
        self.rules
            .check_date(date, self.clock.today(), occupancy)
            .map_err(|reason| BookingError::DateUnavailable { date, reason })?;
        debug!("Selected date {}", date);
        self.draft.date = Some(date);
        self.draft.time = None;
        Ok(())
    }

    pub fn select_time(&mut self, label: &str) -> Result<(), BookingError> {
        let date = self.draft.date.ok_or(BookingError::MissingFields(vec!["date"]))?;
        let occupancy = self
            .availability
            .data()
            .ok_or(BookingError::AvailabilityNotLoaded)?;
        if !self.rules.time_slots().iter().any(|slot| slot == label) {
            return Err(BookingError::SlotUnavailable {
                date,
                time: label.to_string(),
                reason: Ineligible::UnknownSlot,
            });
        }
        if !self.rules.is_slot_bookable(date, label, occupancy) {
            return Err(BookingError::SlotUnavailable {
                date,
                time: label.to_string(),
                reason: Ineligible::SlotFull,
            });
        }
        self.draft.time = Some(label.to_string());
        Ok(())
    }

    /// Validates, posts once and on success moves to Confirmation.
    ///
    /// Local rejections never touch the network. Any failure keeps the draft
    /// and the step so the user can try again.
    pub async fn submit(&mut self) -> BookingSubmissionResult {
        self.submission_error = None;
        match self.try_submit().await {
            Ok(booking) => {
                let result = BookingSubmissionResult::Accepted {
                    local_id: booking.local_id,
                    remote_id: booking.remote_id.clone(),
                };
                self.bookings.push(booking);
                self.draft = BookingDraft::default();
                self.step = Step::Confirmation;
                result
            }
            Err(e) => {
                let message = match &e {
                    BookingError::DateUnavailable { .. } | BookingError::AvailabilityNotLoaded => {
                        SLOT_NO_LONGER_AVAILABLE.to_string()
                    }
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
        if self.step != Step::ServiceDetails {
            return Err(BookingError::InvalidState("booking is not ready to submit"));
        }
        let missing = self.missing_for_step();
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing));
        }
        let date = self.draft.date.ok_or(BookingError::MissingFields(vec!["date"]))?;
        let time = self
            .draft
            .time
            .clone()
            .ok_or(BookingError::MissingFields(vec!["time"]))?;
        let today = self.clock.today();
        {
            let occupancy = self
                .availability
                .data()
                .ok_or(BookingError::AvailabilityNotLoaded)?;
            self.rules
                .check_slot(date, &time, today, occupancy)
                .map_err(|reason| BookingError::SlotUnavailable {
                    date,
                    time: time.clone(),
                    reason,
                })?;
        }

        let payload = stepper_payload(&self.draft, self.clock.now(), self.time_zone)?;
        self.submitting = true;
        let receipt = self.backend.submit_booking(&payload).await;
        self.submitting = false;
        let receipt = receipt?;

        if let Some(occupancy) = self.availability.data_mut() {
            let count = occupancy.increment(date, &time);
            debug!("Occupancy for {} {} is now {}", date, time, count);
        }
        let booking = SessionBooking {
            local_id: Uuid::new_v4(),
            remote_id: receipt.remote_id,
            payload,
        };
        info!("Booking {} confirmed for {} {}", booking.local_id, date, time);
        Ok(booking)
    }

    /// Clears the draft and returns to the first step. Session bookings and
    /// the occupancy view are kept.
    pub fn start_new(&mut self) {
        self.draft = BookingDraft::default();
        self.step = Step::PersonalInfo;
        self.submission_error = None;
    }

    pub fn session_bookings(&self) -> &[SessionBooking] {
        &self.bookings
    }

    pub fn last_booking(&self) -> Option<&SessionBooking> {
        self.bookings.last()
    }

    /// Text of the Confirmation step.
    pub fn confirmation_message(&self) -> Option<String> {
        if self.step != Step::Confirmation {
            return None;
        }
        let booking = self.last_booking()?;
        Some(format!(
            "Thank you for your booking. A confirmation email has been sent to {}.",
            booking.payload.email
        ))
    }
}
