//! Weather API client for WeatherAPI.com
//!
//! This module provides the HTTP client used for location search and
//! forecasts, and the [`WeatherProvider`] seam the rest of the crate talks to.
//! Requests are made once; failures are mapped to typed errors and never
//! retried.

use crate::config::WeatherConfig;
use crate::models::weatherapi::{self, ErrorResponse, NO_MATCHING_LOCATION};
use crate::models::{Candidate, WeatherReport};
use crate::{Result, WeatherError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Source of location candidates and forecasts
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Candidate locations for a free-text query, in provider ranking order
    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;

    /// Current conditions plus `days` (1-7) forecast days for coordinates
    async fn forecast(&self, latitude: f64, longitude: f64, days: u8) -> Result<WeatherReport>;
}

/// Weather API client for WeatherAPI.com
pub struct WeatherApiClient {
    /// HTTP client
    client: Client,
    base_url: String,
    /// Checked when a request is made, so local-only commands work without a key
    api_key: Option<String>,
}

impl WeatherApiClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("weatherdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            WeatherError::config(
                "No weather API key configured. Set weather.api_key or WEATHER_API_KEY.",
            )
        })?;
        let mut url = format!(
            "{}/{endpoint}?key={}",
            self.base_url,
            urlencoding::encode(api_key)
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        Ok(url)
    }

    /// Make a single request and decode the body
    #[instrument(skip(self, url))]
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str, query: &str) -> Result<T> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error after {:.3}s: {}", start_time.elapsed().as_secs_f64(), e);
            if e.is_timeout() {
                WeatherError::provider("request timed out")
            } else {
                WeatherError::provider(format!("network error: {e}"))
            }
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(Self::map_error(status, response, query).await);
        }

        let body = response.json::<T>().await.map_err(|e| {
            error!("Failed to parse {} response: {}", endpoint, e);
            WeatherError::provider(format!("invalid {endpoint} response: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        info!("Successful API request in {:.3}s", total_duration.as_secs_f64());
        if total_duration.as_secs() > 5 {
            warn!("Slow API response detected: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(body)
    }

    async fn map_error(status: StatusCode, response: Response, query: &str) -> WeatherError {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let provider_error = response.json::<ErrorResponse>().await.ok().map(|body| body.error);

        match status.as_u16() {
            429 => {
                warn!("Provider rate limit exceeded (HTTP 429), retry after {:?}s", retry_after);
                WeatherError::ProviderRateLimited { retry_after }
            }
            401 | 403 => {
                error!("API authentication failed (HTTP {})", status.as_u16());
                WeatherError::provider("the weather API key was rejected")
            }
            404 => {
                warn!("Location not found (HTTP 404)");
                WeatherError::not_found(query)
            }
            _ => match provider_error {
                Some(body) if body.code == NO_MATCHING_LOCATION => {
                    warn!("Provider found no matching location for '{}'", query);
                    WeatherError::not_found(query)
                }
                Some(body) => {
                    warn!("Provider error {}: {}", body.code, body.message);
                    WeatherError::provider(format!("{} (code {})", body.message, body.code))
                }
                None => WeatherError::provider(format!(
                    "API request failed with status: {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                )),
            },
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        info!("Searching locations for '{}'", query);
        let url = self.url("search.json", &[("q", query)])?;
        let results: Vec<weatherapi::SearchResult> = self.get_json("search", &url, query).await?;

        let candidates: Vec<Candidate> = results.into_iter().map(Candidate::from).collect();
        if candidates.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            debug!(
                "Search results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.display_name(), c.latitude, c.longitude))
                    .collect::<Vec<_>>()
            );
        }
        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn forecast(&self, latitude: f64, longitude: f64, days: u8) -> Result<WeatherReport> {
        let days = days.clamp(1, 7).to_string();
        let coordinates = format!("{latitude},{longitude}");
        info!("Getting {}-day forecast for coordinates: {:.4}, {:.4}", days, latitude, longitude);

        let url = self.url(
            "forecast.json",
            &[
                ("q", coordinates.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ],
        )?;
        let response: weatherapi::ForecastResponse =
            self.get_json("forecast", &url, &coordinates).await?;

        let mut report = WeatherReport::from(response);
        report.fill_missing_astro();
        Ok(report)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WeatherConfig {
        WeatherConfig {
            api_key: Some("secret key".to_string()),
            base_url: "https://api.weatherapi.com/v1/".to_string(),
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn test_requires_api_key_on_request() {
        let mut config = config();
        config.api_key = None;
        let client = WeatherApiClient::new(&config).unwrap();
        assert!(matches!(
            client.search("London").await,
            Err(WeatherError::Config { .. })
        ));
    }

    #[test]
    fn test_url_encodes_parameters() {
        let client = WeatherApiClient::new(&config()).unwrap();
        assert_eq!(
            client.url("search.json", &[("q", "São Paulo")]).unwrap(),
            "https://api.weatherapi.com/v1/search.json?key=secret%20key&q=S%C3%A3o%20Paulo"
        );
    }
}
