//! Location model for geographic coordinates and metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of decimals two coordinates must share to denote the same place (~1 km)
pub const COORDINATE_PRECISION: u32 = 2;

/// Integer key of a coordinate pair rounded to [`COORDINATE_PRECISION`] decimals
#[must_use]
pub fn coordinate_key(latitude: f64, longitude: f64) -> (i64, i64) {
    let multiplier = 10_f64.powi(i32::try_from(COORDINATE_PRECISION).unwrap_or(2));
    // Rounded degrees times 100 always fit into an i64.
    #[allow(clippy::cast_possible_truncation)]
    (
        (latitude * multiplier).round() as i64,
        (longitude * multiplier).round() as i64,
    )
}

/// Format a coordinate pair the way unnamed places are labelled
#[must_use]
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}, {longitude:.4}")
}

/// A persisted location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct Location {
    pub id: i64,
    /// Location name (city, region, etc.)
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    pub country: Option<String>,
    pub region: Option<String>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format_coordinates(self.latitude, self.longitude)
    }

    /// `name, region, country` with empty parts skipped
    #[must_use]
    pub fn display_name(&self) -> String {
        join_place(&self.name, self.region.as_deref(), self.country.as_deref())
    }
}

/// One possible match for a location query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Candidate {
    /// Provider identifier, if the candidate came from a search
    pub provider_id: Option<i64>,
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub url: Option<String>,
}

impl Candidate {
    /// A candidate for raw coordinates, named by the coordinates themselves
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            provider_id: None,
            name: format_coordinates(latitude, longitude),
            region: None,
            country: None,
            latitude,
            longitude,
            url: None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        join_place(&self.name, self.region.as_deref(), self.country.as_deref())
    }

    #[must_use]
    pub fn is_unnamed(&self) -> bool {
        self.name == format_coordinates(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn coordinate_key(&self) -> (i64, i64) {
        coordinate_key(self.latitude, self.longitude)
    }
}

impl From<&Location> for Candidate {
    fn from(location: &Location) -> Self {
        Self {
            provider_id: None,
            name: location.name.clone(),
            region: location.region.clone(),
            country: location.country.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            url: None,
        }
    }
}

fn join_place(name: &str, region: Option<&str>, country: Option<&str>) -> String {
    let mut parts = vec![name];
    for part in [region, country].into_iter().flatten() {
        if !part.is_empty() && !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts.join(", ")
}
