// --- File: crates/garage_booking/src/factory.rs ---
//! Wires configuration into flows.
//!
//! The factory owns one backend and one clock, and hands them to every flow
//! it builds.
use chrono_tz::Tz;
use garage_config::{AppConfig, FlowVariant};
use std::sync::Arc;
use tracing::info;

use crate::calendar::CalendarFlow;
use crate::cancel::CancellationView;
use crate::clock::{Clock, SystemClock};
use crate::error::BookingError;
use crate::rules::{CalendarRules, StepperRules};
use crate::service::{BookingBackend, WebhookBookingService};
use crate::stepper::StepperFlow;

fn time_zone(config: &AppConfig) -> Result<Tz, BookingError> {
    config
        .time_zone()
        .map_err(|e| BookingError::ConfigError(e.to_string()))
}

pub struct BookingFactory {
    backend: Arc<dyn BookingBackend>,
    clock: Arc<dyn Clock>,
    stepper_rules: StepperRules,
    calendar_rules: CalendarRules,
    time_zone: Tz,
    flow: FlowVariant,
}

impl BookingFactory {
    /// Builds the webhook backend and the system clock from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, BookingError> {
        let time_zone = time_zone(config)?;
        let backend = Arc::new(WebhookBookingService::new(config.endpoints.clone())?);
        let clock = Arc::new(SystemClock::new(time_zone));
        Self::with_parts(config, backend, clock)
    }

    /// Same as [`BookingFactory::from_config`] with an injected backend and clock.
    pub fn with_parts(
        config: &AppConfig,
        backend: Arc<dyn BookingBackend>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BookingError> {
        let time_zone = time_zone(config)?;
        let stepper_rules = StepperRules::from_config(&config.stepper)?;
        let calendar_rules = CalendarRules::from_config(&config.calendar);
        info!(
            "Booking factory ready: flow {:?}, zone {}, {} slot(s)",
            config.booking.flow,
            time_zone,
            stepper_rules.time_slots().len()
        );
        Ok(Self {
            backend,
            clock,
            stepper_rules,
            calendar_rules,
            time_zone,
            flow: config.booking.flow,
        })
    }

    pub fn flow(&self) -> FlowVariant {
        self.flow
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn stepper_rules(&self) -> &StepperRules {
        &self.stepper_rules
    }

    pub fn backend(&self) -> Arc<dyn BookingBackend> {
        self.backend.clone()
    }

    pub fn stepper(&self) -> StepperFlow {
        StepperFlow::new(
            self.backend.clone(),
            self.clock.clone(),
            self.stepper_rules.clone(),
            self.time_zone,
        )
    }

    pub fn calendar(&self) -> CalendarFlow {
        CalendarFlow::new(
            self.backend.clone(),
            self.clock.clone(),
            self.calendar_rules,
            self.time_zone,
        )
    }

    /// Cancellation view for a full link or a bare query string.
    pub fn cancellation(&self, input: &str) -> CancellationView {
        CancellationView::from_input(self.backend.clone(), input)
    }
}
