use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod models;
pub use models::*;


/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "GARAGE";

/// The separator for nested configuration keys in environment variables
pub const CONFIG_SEPARATOR: &str = "__";

// Keys whose environment values are comma separated lists.
const LIST_KEYS: &[&str] = &["stepper.time_slots", "stepper.bank_holidays"];

/// Where configuration is layered from.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Directory holding `default.*` and `<run_env>.*` files.
    pub dir: PathBuf,
    pub run_env: String,
    pub prefix: String,
}

impl ConfigSources {
    /// Resolves sources from `GARAGE_CONFIG_DIR`, `RUN_ENV` and `PREFIX`.
    pub fn from_env() -> Self {
        Self {
            dir: env::var("GARAGE_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("config")),
            run_env: env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string()),
            prefix: env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string()),
        }
    }
}

/// Loads the configuration for this process.
///
/// Layers, lowest first: built-in defaults, `config/default.*`,
/// `config/<RUN_ENV>.*`, then `GARAGE__SECTION__KEY` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    load_config_from(&ConfigSources::from_env())
}

/// Loads and validates configuration from explicit sources.
pub fn load_config_from(sources: &ConfigSources) -> Result<AppConfig, ConfigError> {
    let default_path = sources.dir.join("default");
    let env_path = sources.dir.join(&sources.run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let mut environment = Environment::with_prefix(&sources.prefix)
        .prefix_separator(CONFIG_SEPARATOR)
        .separator(CONFIG_SEPARATOR)
        .try_parsing(true)
        .list_separator(",");
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }

    let builder = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(environment);

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Checks values that serde alone cannot: zone names, slot labels,
    /// holiday dates and capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.time_zone()?;

        if self.stepper.time_slots.is_empty() {
            return Err(invalid("stepper.time_slots must not be empty"));
        }
        for slot in &self.stepper.time_slots {
            NaiveTime::parse_from_str(slot, "%H:%M")
                .map_err(|_| invalid(format!("time slot '{slot}' is not HH:MM")))?;
        }
        for day in &self.stepper.bank_holidays {
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|_| invalid(format!("bank holiday '{day}' is not YYYY-MM-DD")))?;
        }
        if self.stepper.max_bookings_per_slot == 0 {
            return Err(invalid("stepper.max_bookings_per_slot must be at least 1"));
        }
        if self.stepper.lookahead_days < 0 {
            return Err(invalid("stepper.lookahead_days must not be negative"));
        }

        let endpoints = [
            ("availability_url", &self.endpoints.availability_url),
            ("unavailable_dates_url", &self.endpoints.unavailable_dates_url),
            ("booking_url", &self.endpoints.booking_url),
            ("cancel_url", &self.endpoints.cancel_url),
        ];
        for (name, url) in endpoints {
            if url.trim().is_empty() {
                return Err(invalid(format!("endpoints.{name} must be set")));
            }
        }
        Ok(())
    }

    /// The configured IANA zone, used for "today" and appointment instants.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        self.booking
            .time_zone
            .trim()
            .parse::<Tz>()
            .map_err(|_| invalid(format!("unknown time zone '{}'", self.booking.time_zone)))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Message(message.into())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures the dotenv file is loaded into the process environment, once.
///
/// The path defaults to `.env` and can be overridden with `DOTENV_OVERRIDE`.
/// Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
