// --- File: crates/garage_booking/src/rules.rs ---
//! Date and slot eligibility.
//!
//! The stepper and calendar forms apply different windows: the stepper
//! offers tomorrow up to a rolling lookahead, the calendar refuses everything
//! up to one calendar month ahead. The two rule sets are kept separate.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Weekday};
use garage_config::{CalendarRulesConfig, StepperRulesConfig};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::error::BookingError;
use crate::models::{OccupancyMap, UnavailableDates};

/// Why a date or slot is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ineligible {
    InPast,
    Today,
    BeyondLookahead,
    Weekend,
    Holiday,
    FullyBooked,
    SlotFull,
    UnknownSlot,
    Unavailable,
    Blackout,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Ineligible::InPast => "date is in the past",
            Ineligible::Today => "same-day bookings are not taken",
            Ineligible::BeyondLookahead => "date is too far ahead",
            Ineligible::Weekend => "closed at weekends",
            Ineligible::Holiday => "closed on bank holidays",
            Ineligible::FullyBooked => "every slot is fully booked",
            Ineligible::SlotFull => "time slot is fully booked",
            Ineligible::UnknownSlot => "not an offered time slot",
            Ineligible::Unavailable => "date is unavailable",
            Ineligible::Blackout => "bookings open one month ahead",
        };
        f.write_str(text)
    }
}

pub type Eligibility = Result<(), Ineligible>;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Rendering state of one hour button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub label: String,
    pub count: u32,
    pub bookable: bool,
    /// Display-only hint; never affects `bookable`.
    pub busy: bool,
}

// --- Stepper Rules ---

#[derive(Debug, Clone)]
pub struct StepperRules {
    time_slots: Vec<String>,
    capacity: u32,
    busy_threshold: u32,
    lookahead_days: u64,
    holidays: BTreeSet<NaiveDate>,
}

impl StepperRules {
    pub fn new(
        time_slots: Vec<String>,
        capacity: u32,
        busy_threshold: u32,
        lookahead_days: u64,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            time_slots,
            capacity,
            busy_threshold,
            lookahead_days,
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn from_config(config: &StepperRulesConfig) -> Result<Self, BookingError> {
        for slot in &config.time_slots {
            NaiveTime::parse_from_str(slot, "%H:%M")
                .map_err(|_| BookingError::ConfigError(format!("bad time slot '{slot}'")))?;
        }
        let holidays = config
            .bank_holidays
            .iter()
            .map(|day| {
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|_| BookingError::ConfigError(format!("bad bank holiday '{day}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let lookahead_days = u64::try_from(config.lookahead_days).map_err(|_| {
            BookingError::ConfigError("lookahead_days must not be negative".to_string())
        })?;
        Ok(Self::new(
            config.time_slots.clone(),
            config.max_bookings_per_slot,
            config.busy_threshold,
            lookahead_days,
            holidays,
        ))
    }

    pub fn time_slots(&self) -> &[String] {
        &self.time_slots
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_weekend_or_holiday(&self, date: NaiveDate) -> bool {
        is_weekend(date) || self.holidays.contains(&date)
    }

    /// Last date that can be offered.
    pub fn last_bookable_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(self.lookahead_days))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Calendar rules only, ignoring occupancy.
    pub fn check_calendar(&self, date: NaiveDate, today: NaiveDate) -> Eligibility {
        if date < today {
            return Err(Ineligible::InPast);
        }
        if date == today {
            return Err(Ineligible::Today);
        }
        if date > self.last_bookable_date(today) {
            return Err(Ineligible::BeyondLookahead);
        }
        if is_weekend(date) {
            return Err(Ineligible::Weekend);
        }
        if self.holidays.contains(&date) {
            return Err(Ineligible::Holiday);
        }
        Ok(())
    }

    /// Whether the date picker may offer `date`.
    pub fn check_date(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        occupancy: &OccupancyMap,
    ) -> Eligibility {
        self.check_calendar(date, today)?;
        // no data for the date means fully open
        if !occupancy.has_date(date) {
            return Ok(());
        }
        let all_full = self
            .time_slots
            .iter()
            .all(|slot| occupancy.count(date, slot) >= self.capacity);
        if all_full {
            debug!("{} rejected: all {} slots full", date, self.time_slots.len());
            return Err(Ineligible::FullyBooked);
        }
        Ok(())
    }

    pub fn is_date_selectable(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        occupancy: &OccupancyMap,
    ) -> bool {
        self.check_date(date, today, occupancy).is_ok()
    }

    /// Per-hour capacity check alone.
    pub fn is_slot_bookable(&self, date: NaiveDate, slot: &str, occupancy: &OccupancyMap) -> bool {
        occupancy.count(date, slot) < self.capacity
    }

    pub fn slot_status(&self, date: NaiveDate, slot: &str, occupancy: &OccupancyMap) -> SlotStatus {
        let count = occupancy.count(date, slot);
        SlotStatus {
            label: slot.to_string(),
            count,
            bookable: count < self.capacity,
            busy: count > self.busy_threshold,
        }
    }

    /// Status of every configured hour on `date`, in slot order.
    pub fn slot_statuses(&self, date: NaiveDate, occupancy: &OccupancyMap) -> Vec<SlotStatus> {
        self.time_slots
            .iter()
            .map(|slot| self.slot_status(date, slot, occupancy))
            .collect()
    }

    /// Full check used right before submitting: date rules, then the slot.
    pub fn check_slot(
        &self,
        date: NaiveDate,
        slot: &str,
        today: NaiveDate,
        occupancy: &OccupancyMap,
    ) -> Eligibility {
        self.check_date(date, today, occupancy)?;
        if !self.time_slots.iter().any(|s| s == slot) {
            return Err(Ineligible::UnknownSlot);
        }
        if !self.is_slot_bookable(date, slot, occupancy) {
            return Err(Ineligible::SlotFull);
        }
        Ok(())
    }

    /// Every date the picker would currently offer.
    pub fn selectable_dates(&self, today: NaiveDate, occupancy: &OccupancyMap) -> Vec<NaiveDate> {
        let last = self.last_bookable_date(today);
        today
            .iter_days()
            .take_while(|date| *date <= last)
            .filter(|date| self.is_date_selectable(*date, today, occupancy))
            .collect()
    }
}

impl Default for StepperRules {
    fn default() -> Self {
        // the shipped defaults always parse
        Self::from_config(&StepperRulesConfig::default())
            .unwrap_or_else(|_| Self::new(Vec::new(), 2, 1, 30, Vec::new()))
    }
}

// --- Calendar Rules ---

#[derive(Debug, Clone, Copy)]
pub struct CalendarRules {
    blackout_months: u32,
}

impl CalendarRules {
    pub fn new(blackout_months: u32) -> Self {
        Self { blackout_months }
    }

    pub fn from_config(config: &CalendarRulesConfig) -> Self {
        Self::new(config.blackout_months)
    }

    /// Last day of the blackout window (inclusive). Month ends clamp, so
    /// Jan 31 + 1 month is Feb 28/29.
    pub fn blackout_end(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_months(Months::new(self.blackout_months))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn first_bookable_date(&self, today: NaiveDate) -> NaiveDate {
        self.blackout_end(today).succ_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn check_date(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        unavailable: &UnavailableDates,
    ) -> Eligibility {
        if is_weekend(date) {
            return Err(Ineligible::Weekend);
        }
        if unavailable.contains(date) {
            return Err(Ineligible::Unavailable);
        }
        if date >= today && date <= self.blackout_end(today) {
            return Err(Ineligible::Blackout);
        }
        if date < today {
            return Err(Ineligible::InPast);
        }
        Ok(())
    }

    pub fn is_date_selectable(
        &self,
        date: NaiveDate,
        today: NaiveDate,
        unavailable: &UnavailableDates,
    ) -> bool {
        self.check_date(date, today, unavailable).is_ok()
    }
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self::from_config(&CalendarRulesConfig::default())
    }
}
