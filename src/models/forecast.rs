//! Weather report model: provider location, current conditions and daily forecast

use super::CurrentConditions;
use super::weather::Condition;
use crate::query::DateRange;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// The location block as the provider names it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderLocation {
    pub name: String,
    pub region: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA time zone, e.g. `Europe/London`
    pub tz_id: String,
    /// Local time at the location when the report was produced
    pub localtime: String,
}

/// One forecast day, in metric units
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub max_wind_kph: f64,
    pub total_precip_mm: f64,
    pub avg_humidity: f64,
    pub chance_of_rain: u8,
    pub chance_of_snow: u8,
    pub uv: f64,
    pub condition: Condition,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Normalized result of one provider forecast call
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherReport {
    pub location: ProviderLocation,
    pub current: CurrentConditions,
    /// Forecast days sorted by date
    pub forecast: Vec<ForecastDay>,
    /// When this report was retrieved
    pub retrieved_at: DateTime<Utc>,
}

impl WeatherReport {
    /// Calendar date at the location when the report was produced
    #[must_use]
    pub fn local_date(&self) -> Option<NaiveDate> {
        let date = self.location.localtime.split_whitespace().next()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    /// Drop forecast days outside the range
    pub fn restrict_to(&mut self, range: &DateRange) {
        self.forecast.retain(|day| range.contains(day.date));
    }

    /// Compute sunrise and sunset locally for days the provider left without them
    pub fn fill_missing_astro(&mut self) {
        let (latitude, longitude) = (self.location.latitude, self.location.longitude);
        for day in &mut self.forecast {
            if day.sunrise.is_some() && day.sunset.is_some() {
                continue;
            }
            let Some(coords) = Coordinates::new(latitude, longitude) else {
                return;
            };
            let solar_day = SolarDay::new(coords, day.date);
            if day.sunrise.is_none() {
                day.sunrise = solar_day
                    .event_time(SolarEvent::Sunrise)
                    .map(|time| time.format("%H:%M UTC").to_string());
            }
            if day.sunset.is_none() {
                day.sunset = solar_day
                    .event_time(SolarEvent::Sunset)
                    .map(|time| time.format("%H:%M UTC").to_string());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn forecast_day(date: NaiveDate, max_temp_c: f64) -> ForecastDay {
        ForecastDay {
            date,
            max_temp_c,
            min_temp_c: max_temp_c - 8.0,
            avg_temp_c: max_temp_c - 4.0,
            max_wind_kph: 20.0,
            total_precip_mm: 1.2,
            avg_humidity: 70.0,
            chance_of_rain: 40,
            chance_of_snow: 0,
            uv: 3.0,
            condition: Condition {
                text: "Partly cloudy".to_string(),
                icon: String::new(),
                code: 1003,
            },
            sunrise: Some("07:01 AM".to_string()),
            sunset: Some("06:12 PM".to_string()),
        }
    }

    pub fn report(name: &str, latitude: f64, longitude: f64, first_day: NaiveDate, days: u32) -> WeatherReport {
        WeatherReport {
            location: ProviderLocation {
                name: name.to_string(),
                region: "City of London, Greater London".to_string(),
                country: "United Kingdom".to_string(),
                latitude,
                longitude,
                tz_id: "Europe/London".to_string(),
                localtime: format!("{first_day} 12:00"),
            },
            current: CurrentConditions {
                last_updated: "2026-10-19 11:45".to_string(),
                temperature_c: 14.0,
                feels_like_c: 12.5,
                humidity: 77,
                pressure_mb: 1012.0,
                wind_kph: 15.1,
                gust_kph: Some(22.3),
                wind_degree: 230,
                wind_dir: "SW".to_string(),
                precip_mm: 0.1,
                cloud: 75,
                uv: 2.0,
                visibility_km: Some(10.0),
                condition: Condition {
                    text: "Light rain".to_string(),
                    icon: String::new(),
                    code: 1183,
                },
            },
            forecast: (0..days)
                .map(|offset| {
                    forecast_day(
                        first_day + chrono::Duration::days(i64::from(offset)),
                        15.0 + f64::from(offset),
                    )
                })
                .collect(),
            retrieved_at: Utc::now(),
        }
    }
}
