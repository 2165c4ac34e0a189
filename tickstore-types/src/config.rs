//! Configuration types shared by the service and its backends.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Default measurement name that price points are written to.
pub const DEFAULT_MEASUREMENT: &str = "ticker";

/// Default timezone chart queries are evaluated in.
pub const DEFAULT_DISPLAY_TZ: Tz = chrono_tz::Europe::Moscow;

/// Root application configuration as read from the YAML config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub main: MainConfig,
    /// Backend connection settings.
    pub influx: InfluxConfig,
    /// Time-series service settings.
    #[serde(default)]
    pub timeseries: TimeSeriesConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainConfig {
    /// Logger settings.
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// `"error"`, `"info"`; any other value selects debug.
    #[serde(rename = "log_level", default = "default_log_level")]
    pub level: String,
    /// Force coloured, human-oriented output.
    #[serde(default)]
    pub is_dev_mode: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            is_dev_mode: false,
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

/// InfluxDB 1.x connection settings. All fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Host name or address, without scheme.
    #[serde(default)]
    pub host: String,
    /// HTTP API port.
    #[serde(default)]
    pub port: u16,
    /// Database all reads and writes go to.
    #[serde(default)]
    pub db_name: String,
}

/// Settings for the time-series service itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesConfig {
    /// Measurement price points are written to and read from.
    #[serde(default = "default_measurement")]
    pub measurement: String,
    /// Timezone chart buckets are aligned to and rendered in.
    #[serde(default = "default_display_tz")]
    pub display_tz: Tz,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            measurement: default_measurement(),
            display_tz: DEFAULT_DISPLAY_TZ,
        }
    }
}

fn default_measurement() -> String {
    DEFAULT_MEASUREMENT.to_string()
}

const fn default_display_tz() -> Tz {
    DEFAULT_DISPLAY_TZ
}
