// --- File: crates/garage_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Booking Flow Selection ---
/// Which booking front end a deployment runs.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowVariant {
    /// Four-step wizard with per-hour capacity.
    #[default]
    Stepper,
    /// Single page form with an inline month calendar.
    Calendar,
}

impl std::str::FromStr for FlowVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stepper" => Ok(FlowVariant::Stepper),
            "calendar" => Ok(FlowVariant::Calendar),
            other => Err(format!("unknown flow variant '{other}'")),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    #[serde(default)]
    pub flow: FlowVariant,
    /// IANA zone used for "today" and for appointment instants.
    pub time_zone: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            flow: FlowVariant::Stepper,
            time_zone: "Europe/Dublin".to_string(),
        }
    }
}

// --- Remote Webhook Endpoints ---
// All four are plain URLs of the automation service. Nothing secret lives here.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EndpointsConfig {
    pub availability_url: String,      // GET, per-hour occupancy (stepper)
    pub unavailable_dates_url: String, // GET, { "dates": [...] } (calendar)
    pub booking_url: String,           // POST booking JSON
    pub cancel_url: String,            // POST { "bookingId": ... }
    /// None keeps the transport default (no timeout).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            availability_url: "https://example.app.n8n.cloud/webhook/availability".to_string(),
            unavailable_dates_url: "https://example.app.n8n.cloud/webhook/unavailable-dates"
                .to_string(),
            booking_url: "https://example.app.n8n.cloud/webhook/booking".to_string(),
            cancel_url: "https://example.app.n8n.cloud/webhook/cancel-booking".to_string(),
            request_timeout_secs: None,
        }
    }
}

// --- Stepper Eligibility Rules ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StepperRulesConfig {
    /// Bookable hour labels, "HH:MM".
    pub time_slots: Vec<String>,
    /// A slot is bookable while its occupancy is strictly below this.
    pub max_bookings_per_slot: u32,
    /// Occupancy above this marks a slot as busy (display only).
    pub busy_threshold: u32,
    /// Last bookable day, counted from today.
    pub lookahead_days: i64,
    /// Closed days, "YYYY-MM-DD".
    #[serde(default)]
    pub bank_holidays: Vec<String>,
}

impl Default for StepperRulesConfig {
    fn default() -> Self {
        Self {
            time_slots: [
                "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_bookings_per_slot: 2,
            busy_threshold: 1,
            lookahead_days: 30,
            bank_holidays: IRISH_BANK_HOLIDAYS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Irish bank holidays shipped as the default closed-day list.
pub const IRISH_BANK_HOLIDAYS: &[&str] = &[
    // 2024
    "2024-01-01",
    "2024-03-18",
    "2024-04-01",
    "2024-05-06",
    "2024-06-03",
    "2024-08-05",
    "2024-10-28",
    "2024-12-25",
    "2024-12-26",
    // 2025
    "2025-01-01",
    "2025-03-17",
    "2025-04-21",
    "2025-05-05",
    "2025-06-02",
    "2025-08-04",
    "2025-10-27",
    "2025-12-25",
    "2025-12-26",
];

// --- Calendar Eligibility Rules ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarRulesConfig {
    /// No booking on or before today + this many calendar months.
    pub blackout_months: u32,
}

impl Default for CalendarRulesConfig {
    fn default() -> Self {
        Self { blackout_months: 1 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub stepper: StepperRulesConfig,
    #[serde(default)]
    pub calendar: CalendarRulesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
