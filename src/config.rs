//! Configuration management for the weatherdash application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherError;
use crate::units::UnitSystem;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Legacy environment variable holding the provider key
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Root configuration structure for the weatherdash application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web server configuration
    #[serde(default)]
    pub web: WebConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WeatherAPI.com key
    pub api_key: Option<String>,
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Database configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file, `:memory:` for a throwaway database
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Log output destination (console, file, both)
    #[serde(default = "default_log_output")]
    pub output: String,
    /// Log file path
    #[serde(default = "default_log_file_path")]
    pub file_path: String,
}

/// Web server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// PEM certificate, enables HTTPS together with `tls_key`
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Unit used when neither the request nor the stored settings name one
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Forecast length for new settings rows
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
    /// Pick the provider's first result instead of asking
    #[serde(default)]
    pub auto_select_first: bool,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("weatherdash").join("weatherdash.db"))
        .unwrap_or_else(|| PathBuf::from("weatherdash.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

fn default_log_file_path() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("weatherdash").join("weatherdash.log"))
        .unwrap_or_else(|| PathBuf::from("weatherdash.log"))
        .to_string_lossy()
        .into_owned()
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_unit() -> String {
    "C".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
            file_path: default_log_file_path(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            forecast_days: default_forecast_days(),
            auto_select_first: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHERDASH_WEATHER__API_KEY, WEATHERDASH_WEB__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("WEATHERDASH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.weather.api_key.is_none() {
            config.weather.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherdash").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self
            .weather
            .api_key
            .as_ref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.weather.api_key = None;
        }
        if self.database.path.is_empty() {
            self.database.path = default_database_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.output.is_empty() {
            self.logging.output = default_log_output();
        }
        if self.logging.file_path.is_empty() {
            self.logging.file_path = default_log_file_path();
        }
        if self.web.host.is_empty() {
            self.web.host = default_web_host();
        }
        if self.defaults.unit.is_empty() {
            self.defaults.unit = default_unit();
        }
        if self.defaults.forecast_days == 0 {
            self.defaults.forecast_days = default_forecast_days();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the provider key; a missing key is reported when a lookup needs it
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.len() < 8 {
                return Err(WeatherError::config(
                    "Weather API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(WeatherError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if !(1..=7).contains(&self.defaults.forecast_days) {
            return Err(WeatherError::config("Default forecast days must be between 1 and 7").into());
        }

        if self.web.port == 0 {
            return Err(WeatherError::config("Web port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_log_outputs = ["console", "file", "both"];
        if !valid_log_outputs.contains(&self.logging.output.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log output '{}'. Must be one of: {}",
                self.logging.output,
                valid_log_outputs.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WeatherError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        self.default_unit()?;

        if self.web.tls_cert.is_some() != self.web.tls_key.is_some() {
            return Err(WeatherError::config(
                "web.tls_cert and web.tls_key must be set together",
            )
            .into());
        }

        Ok(())
    }

    /// Parsed `defaults.unit`
    pub fn default_unit(&self) -> Result<UnitSystem> {
        self.defaults
            .unit
            .parse::<UnitSystem>()
            .map_err(|_| {
                WeatherError::config(format!(
                    "Invalid default unit '{}'. Use C or F",
                    self.defaults.unit
                ))
                .into()
            })
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("weatherdash");
            std::fs::create_dir_all(&app_config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    app_config_dir.display()
                )
            })?;
            Ok(app_config_dir)
        } else {
            Err(WeatherError::config("Unable to determine config directory").into())
        }
    }
}
