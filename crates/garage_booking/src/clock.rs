//! Source of "now" and "today" for the flows.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Today's civil date in the clock's zone.
    fn today(&self) -> NaiveDate;
}

/// Process clock read in a fixed civil zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    time_zone: Tz,
}

impl SystemClock {
    pub fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.time_zone).date_naive()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    time_zone: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, time_zone: Tz) -> Self {
        Self { now, time_zone }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.time_zone).date_naive()
    }
}
