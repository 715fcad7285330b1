//! Wire types for the WeatherAPI.com `search.json` and `forecast.json` endpoints

use super::weather::Condition;
use super::{Candidate, CurrentConditions, ForecastDay, ProviderLocation, WeatherReport};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

/// One entry of the `search.json` array
#[derive(Debug, Deserialize, Clone)]
pub struct SearchResult {
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: Option<String>,
}

impl From<SearchResult> for Candidate {
    fn from(result: SearchResult) -> Self {
        Self {
            provider_id: result.id,
            name: result.name,
            region: non_empty(result.region),
            country: non_empty(result.country),
            latitude: result.lat,
            longitude: result.lon,
            url: result.url,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Error envelope, e.g. `{"error": {"code": 1006, "message": "No matching location found."}}`
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: u32,
    pub message: String,
}

/// Provider error code for "No matching location found"
pub const NO_MATCHING_LOCATION: u32 = 1006;

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub location: LocationBlock,
    pub current: CurrentBlock,
    #[serde(default)]
    pub forecast: Option<ForecastBlock>,
}

#[derive(Debug, Deserialize)]
pub struct LocationBlock {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentBlock {
    #[serde(default)]
    pub last_updated: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: u16,
    #[serde(default)]
    pub wind_dir: String,
    pub pressure_mb: f64,
    #[serde(default)]
    pub precip_mm: f64,
    pub humidity: u8,
    #[serde(default)]
    pub cloud: u8,
    #[serde(default)]
    pub uv: f64,
    pub gust_kph: Option<f64>,
    pub vis_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastBlock {
    #[serde(default)]
    pub forecastday: Vec<ForecastDayBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastDayBlock {
    pub date: NaiveDate,
    pub day: DayBlock,
    pub astro: Option<AstroBlock>,
}

#[derive(Debug, Deserialize)]
pub struct DayBlock {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxwind_kph: f64,
    #[serde(default)]
    pub totalprecip_mm: f64,
    #[serde(default)]
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_chance_of_rain: u8,
    #[serde(default)]
    pub daily_chance_of_snow: u8,
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Deserialize)]
pub struct AstroBlock {
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// The provider writes "No sunrise" / "No sunset" for polar days
fn astro_time(value: Option<String>) -> Option<String> {
    value.filter(|time| !time.trim().is_empty() && !time.starts_with("No "))
}

impl From<ForecastResponse> for WeatherReport {
    fn from(response: ForecastResponse) -> Self {
        let ForecastResponse {
            location,
            current,
            forecast,
        } = response;

        let forecast = forecast
            .map(|block| block.forecastday)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                let (sunrise, sunset) = entry
                    .astro
                    .map(|astro| (astro_time(astro.sunrise), astro_time(astro.sunset)))
                    .unwrap_or_default();
                ForecastDay {
                    date: entry.date,
                    max_temp_c: entry.day.maxtemp_c,
                    min_temp_c: entry.day.mintemp_c,
                    avg_temp_c: entry.day.avgtemp_c,
                    max_wind_kph: entry.day.maxwind_kph,
                    total_precip_mm: entry.day.totalprecip_mm,
                    avg_humidity: entry.day.avghumidity,
                    chance_of_rain: entry.day.daily_chance_of_rain,
                    chance_of_snow: entry.day.daily_chance_of_snow,
                    uv: entry.day.uv,
                    condition: entry.day.condition,
                    sunrise,
                    sunset,
                }
            })
            .collect();

        WeatherReport {
            location: ProviderLocation {
                name: location.name,
                region: location.region,
                country: location.country,
                latitude: location.lat,
                longitude: location.lon,
                tz_id: location.tz_id,
                localtime: location.localtime,
            },
            current: CurrentConditions {
                last_updated: current.last_updated,
                temperature_c: current.temp_c,
                feels_like_c: current.feelslike_c,
                humidity: current.humidity,
                pressure_mb: current.pressure_mb,
                wind_kph: current.wind_kph,
                gust_kph: current.gust_kph,
                wind_degree: current.wind_degree,
                wind_dir: current.wind_dir,
                precip_mm: current.precip_mm,
                cloud: current.cloud,
                uv: current.uv,
                visibility_km: current.vis_km,
                condition: current.condition,
            },
            forecast,
            retrieved_at: Utc::now(),
        }
    }
}
