// --- File: crates/garage_booking/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
pub mod calendar;
pub mod cancel;
pub mod clock;
pub mod error;
pub mod factory;
pub mod models;
pub mod registration;
pub mod rules;
#[cfg(test)]
mod rules_proptest;
pub mod service;
#[cfg(test)]
mod service_test;
pub mod stepper;
#[cfg(test)]
mod stepper_test;
pub mod submission;

pub use error::BookingError;
pub use factory::BookingFactory;
