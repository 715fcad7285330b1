//! Data models for the weatherdash application
//!
//! - Location: persisted places and search candidates
//! - Weather: current conditions
//! - Forecast: the normalized provider report
//! - Record / Settings: stored history and preferences
//! - Weatherapi: provider wire types

pub mod forecast;
pub mod location;
pub mod record;
pub mod settings;
pub mod weather;
pub mod weatherapi;

pub use forecast::{ForecastDay, ProviderLocation, WeatherReport};
pub use location::{Candidate, Location};
pub use record::{NewWeatherRecord, WeatherRecord};
pub use settings::{SettingsPatch, UserSettings};
pub use weather::{Condition, CurrentConditions};
