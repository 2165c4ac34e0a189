//! Loading and validation of the YAML configuration file.

use std::path::Path;

use thiserror::Error;
use tickstore_core::AppConfig;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("config validation failed: {0}")]
    ValidationError(String),

    /// Missing required environment variable.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Read, parse, and validate the configuration file at `path`.
///
/// # Errors
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_config_from_str(&contents)
}

/// Parse and validate configuration from a YAML string.
///
/// # Errors
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_str(yaml: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_yaml_bw::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the configuration file named by `CONFIG_PATH`.
///
/// # Errors
/// Returns `MissingEnvVar` when `CONFIG_PATH` is unset or empty, otherwise as
/// [`load_config`].
pub fn load_config_from_env() -> Result<AppConfig, ConfigError> {
    load_config_with(|key| std::env::var(key).ok())
}

/// Like [`load_config_from_env`], resolving variables through `lookup`.
///
/// # Errors
/// As [`load_config_from_env`].
pub fn load_config_with<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup(CONFIG_PATH_VAR)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(CONFIG_PATH_VAR.to_string()))?;
    load_config(path)
}

/// Check the fields the service cannot run without.
///
/// # Errors
/// Returns `ValidationError` naming the first missing influx setting.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let influx = &config.influx;
    if influx.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "influx.host is required".to_string(),
        ));
    }
    if influx.port == 0 {
        return Err(ConfigError::ValidationError(
            "influx.port is required".to_string(),
        ));
    }
    if influx.db_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "influx.db_name is required".to_string(),
        ));
    }
    if config.timeseries.measurement.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "timeseries.measurement must not be empty".to_string(),
        ));
    }
    Ok(())
}
