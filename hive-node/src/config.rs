use std::{fs, path::Path, time::Duration};

use hive_availability::{AggregatorConfig, GoogleCalendarConfig, MAX_WINDOW_DAYS};
use hive_common::{utils::time::local_offset, HiveError, Result};
use serde::{Deserialize, Serialize};

/// Node configuration, stored as pretty JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Offset of the hive's local time zone from UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_calendar_timeout_ms")]
    pub calendar_timeout_ms: u64,
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleCalendarConfig>,
    /// JSON file with members and hives loaded at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_path: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_calendar_timeout_ms() -> u64 {
    5000
}

fn default_window_days() -> i64 {
    14
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "hive-node".to_string(),
            listen_addr: default_listen_addr(),
            port: default_port(),
            utc_offset_minutes: 0,
            calendar_timeout_ms: default_calendar_timeout_ms(),
            window_days: default_window_days(),
            google: None,
            directory_path: None,
        }
    }
}

impl Config {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<Config>(&data)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HiveError::Config("name must not be empty".into()));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(HiveError::Config(format!(
                "window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.window_days
            )));
        }
        if self.calendar_timeout_ms == 0 {
            return Err(HiveError::Config("calendar_timeout_ms must be positive".into()));
        }
        local_offset(self.utc_offset_minutes)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }

    pub fn aggregator_config(&self) -> Result<AggregatorConfig> {
        Ok(AggregatorConfig {
            fetch_timeout: Duration::from_millis(self.calendar_timeout_ms),
            window_days: self.window_days,
            offset: local_offset(self.utc_offset_minutes)?,
            ..AggregatorConfig::default()
        })
    }

    /// Google credentials after applying environment overrides, if usable.
    pub fn google_credentials(&self) -> Option<GoogleCalendarConfig> {
        let google = self.google.clone().unwrap_or_default().with_env_overrides();
        google.is_configured().then_some(google)
    }
}
