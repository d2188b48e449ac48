//! Configuration management for `RailTemp`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RailTempError;
use crate::thermal::ModelCoefficients;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `RailTemp`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RailTempConfig {
    /// Thermal model coefficients
    pub model: ModelCoefficients,
    /// Weather API configuration
    pub api: ApiConfig,
    /// Input and output locations
    pub paths: PathsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for the Open-Meteo API
    pub base_url: String,
    /// Comma-separated hourly variables to request
    pub hourly_variables: String,
    /// IANA timezone used for requests and for naive timestamps
    pub timezone: String,
    /// Maximum number of concurrent location requests
    pub max_workers: usize,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
    /// Days of history fetched when no history exists yet
    pub past_days: u32,
    /// Forecast days fetched on refresh runs
    pub forecast_days: u32,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON list of monitored locations
    pub locations_file: PathBuf,
    /// Directory of the history store
    pub history_dir: PathBuf,
    /// Optional JSON export of the reconciled series
    pub export_file: Option<PathBuf>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1".to_string(),
            hourly_variables:
                "temperature_2m,precipitation,weather_code,wind_speed_10m,direct_normal_irradiance"
                    .to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            max_workers: 10,
            timeout_seconds: 30,
            max_retries: 3,
            past_days: 7,
            forecast_days: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            locations_file: PathBuf::from("data/coordenadas.json"),
            history_dir: PathBuf::from("data/rail_prediction_history"),
            export_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl RailTempConfig {
    /// Load configuration from `config_path` or the default locations,
    /// then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // RAILTEMP_API__TIMEZONE=UTC overrides api.timezone
        builder = builder.add_source(
            Environment::with_prefix("RAILTEMP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: RailTempConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("railtemp").join("config.toml"))
    }

    /// Parsed reference timezone
    pub fn reference_tz(&self) -> Result<Tz> {
        self.api.timezone.parse::<Tz>().map_err(|_| {
            RailTempError::config(format!("Unknown timezone '{}'", self.api.timezone)).into()
        })
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=64).contains(&self.api.max_workers) {
            return Err(RailTempError::config("API max workers must be between 1 and 64").into());
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 300 {
            return Err(RailTempError::config(
                "API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.api.max_retries > 10 {
            return Err(RailTempError::config("API max retries cannot exceed 10").into());
        }

        if self.api.past_days > 92 || self.api.forecast_days > 16 {
            return Err(RailTempError::config(
                "Fetch window exceeds the API limits (92 past days, 16 forecast days)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RailTempError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RailTempError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(RailTempError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.api.hourly_variables.trim().is_empty() {
            return Err(RailTempError::config("Hourly variables cannot be empty").into());
        }

        self.reference_tz()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RailTempConfig::default();
        assert_eq!(config.api.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.api.timezone, "America/Sao_Paulo");
        assert_eq!(config.api.max_workers, 10);
        assert_eq!(config.api.past_days, 7);
        assert_eq!(config.api.forecast_days, 3);
        assert_eq!(config.model, ModelCoefficients::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = RailTempConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = RailTempConfig::default();
        config.api.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_config_validation_unknown_timezone() {
        let mut config = RailTempConfig::default();
        config.api.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_model_coefficients() {
        let mut config = RailTempConfig::default();
        config.model.retention_factor = -0.1;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Retention factor"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[model]\nretention_factor = 0.75\n\n[api]\ntimezone = \"UTC\"\nmax_workers = 4"
        )
        .unwrap();

        let config = RailTempConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.model.retention_factor, 0.75);
        assert_eq!(config.model.wind_adjustment_factor, 8.5);
        assert_eq!(config.api.max_workers, 4);
        assert_eq!(config.reference_tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = RailTempConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("railtemp"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
