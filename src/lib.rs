//! weatherdash - weather lookups with location disambiguation
//!
//! This library resolves free-text locations against a weather provider,
//! interprets natural-language dates, keeps saved locations and weather
//! history in SQLite, and serves both a CLI and a small web dashboard.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod query;
pub mod service;
pub mod units;
pub mod web;

// Re-export core types for public API
pub use api::{WeatherApiClient, WeatherProvider};
pub use config::AppConfig;
pub use db::Db;
pub use error::WeatherError;
pub use location_resolver::{LocationResolver, Resolution};
pub use models::{Candidate, Location, WeatherReport};
pub use query::{DateExpression, DateRange, Interpretation, LocationInput, LocationParser, QueryInterpreter};
pub use service::{Lookup, WeatherRequest, WeatherResult, WeatherService};
pub use units::UnitSystem;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
