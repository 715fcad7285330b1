//! Error types and handling for the weatherdash application

use crate::models::Candidate;
use thiserror::Error;

/// Main error type for the weatherdash application
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The query was empty or whitespace only
    #[error("Query is empty")]
    QueryEmpty,

    /// The provider returned no match for a query
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// More than one candidate matched and no selection was made
    #[error("Location '{query}' is ambiguous ({} candidates)", candidates.len())]
    LocationAmbiguous {
        query: String,
        candidates: Vec<Candidate>,
    },

    /// Network failure, timeout, bad key, 5xx or an unparseable body
    #[error("Weather provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// The provider answered with HTTP 429
    #[error("Weather provider rate limit exceeded")]
    ProviderRateLimited { retry_after: Option<u64> },

    /// Database errors
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherError {
    /// Create a new location-not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::QueryEmpty => "Please enter a location.".to_string(),
            WeatherError::LocationNotFound { query } => {
                format!("No location found for '{query}'. Try a different spelling or add the country.")
            }
            WeatherError::LocationAmbiguous { query, candidates } => format!(
                "'{query}' matches {} locations. Please pick one.",
                candidates.len()
            ),
            WeatherError::ProviderUnavailable { .. } => {
                "The weather service is unavailable right now. Please try again later.".to_string()
            }
            WeatherError::ProviderRateLimited { retry_after } => match retry_after {
                Some(seconds) => format!(
                    "Too many requests to the weather service. Please wait {seconds} seconds."
                ),
                None => "Too many requests to the weather service. Please wait a moment."
                    .to_string(),
            },
            WeatherError::Persistence { .. } => {
                "Could not access saved data. Please check the database file.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherError::Validation { message } => format!("Invalid input: {message}"),
            WeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<sqlx::Error> for WeatherError {
    fn from(error: sqlx::Error) -> Self {
        Self::persistence(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for WeatherError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        Self::persistence(format!("migration failed: {error}"))
    }
}
