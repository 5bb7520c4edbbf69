//! Application configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_CALENDAR_NAME, DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, REQUIRED_SCOPES,
};
use crate::error::{Error, Result};
use crate::timestamp::Clock;

const ENV_PREFIX: &str = "ACTIVITY_LOGGER";

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_required_scopes() -> Vec<String> {
    REQUIRED_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Settings at ~/.config/activity-logger/config.toml
///
/// Provider credentials are kept separately by the provider crate.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// IANA zone for displayed times; the machine's zone when unset.
    pub timezone: Option<String>,

    #[serde(default = "default_required_scopes")]
    pub required_scopes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            calendar_name: default_calendar_name(),
            lookback_days: default_lookback_days(),
            timezone: None,
            required_scopes: default_required_scopes(),
        }
    }
}

/// ~/.config/activity-logger
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
        .join("activity-logger"))
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if nothing is there yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_file(&path, false)
    }

    /// Load from an explicitly chosen TOML file, which must exist, layered
    /// under `ACTIVITY_LOGGER_*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_file(path, true)
    }

    fn load_file(path: &Path, required: bool) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.calendar_name.is_empty() {
            return Err(Error::Config("calendar_name must not be empty".into()));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(Error::Config(format!(
                "lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}, got {}",
                self.lookback_days
            )));
        }
        self.clock()?;
        Ok(())
    }

    /// Clock used to format displayed timestamps.
    pub fn clock(&self) -> Result<Clock> {
        match &self.timezone {
            None => Ok(Clock::Local),
            Some(name) => name
                .parse::<chrono_tz::Tz>()
                .map(Clock::Zoned)
                .map_err(|_| Error::Config(format!("Unknown timezone '{name}'"))),
        }
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# activity-logger configuration

# Calendar that activities are logged to (created if missing):
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"

# How many days of history the recent list shows:
# lookback_days = {DEFAULT_LOOKBACK_DAYS}

# Time zone for displayed times (defaults to the system zone):
# timezone = \"Europe/Helsinki\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
