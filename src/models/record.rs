//! Stored snapshots of current conditions

use super::CurrentConditions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted weather snapshot for a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct WeatherRecord {
    pub id: i64,
    pub location_id: i64,
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Feels-like temperature in Celsius
    pub feels_like: f64,
    pub humidity: i64,
    /// Pressure in millibar
    pub pressure: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    pub wind_direction: String,
    /// Short condition label, e.g. `Rain`
    pub condition: String,
    /// Full provider description, e.g. `Patchy light rain`
    pub condition_description: String,
}

/// A weather snapshot that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherRecord {
    pub location_id: i64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: String,
    pub condition: String,
    pub condition_description: String,
}

impl NewWeatherRecord {
    #[must_use]
    pub fn from_current(location_id: i64, current: &CurrentConditions, timestamp: DateTime<Utc>) -> Self {
        Self {
            location_id,
            timestamp,
            temperature: current.temperature_c,
            feels_like: current.feels_like_c,
            humidity: i64::from(current.humidity),
            pressure: current.pressure_mb,
            wind_speed: current.wind_kph,
            wind_direction: current.compass().to_string(),
            condition: short_condition(&current.condition.text),
            condition_description: current.condition.text.clone(),
        }
    }
}

/// Collapse a provider description to a one-word condition label
fn short_condition(text: &str) -> String {
    let lower = text.to_lowercase();
    let label = [
        ("thunder", "Thunderstorm"),
        ("snow", "Snow"),
        ("sleet", "Snow"),
        ("blizzard", "Snow"),
        ("drizzle", "Drizzle"),
        ("rain", "Rain"),
        ("shower", "Rain"),
        ("fog", "Fog"),
        ("mist", "Mist"),
        ("overcast", "Clouds"),
        ("cloud", "Clouds"),
        ("sunny", "Clear"),
        ("clear", "Clear"),
    ]
    .iter()
    .find(|(needle, _)| lower.contains(needle))
    .map(|(_, label)| *label);

    label.map_or_else(|| text.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Patchy light rain", "Rain")]
    #[case("Light drizzle", "Drizzle")]
    #[case("Partly cloudy", "Clouds")]
    #[case("Sunny", "Clear")]
    #[case("Moderate or heavy snow with thunder", "Thunderstorm")]
    #[case("Dust", "Dust")]
    fn test_short_condition(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(short_condition(text), expected);
    }
}
