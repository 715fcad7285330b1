use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;

use super::DbContext;
use crate::Result;
use crate::models::location::coordinate_key;
use crate::models::{Candidate, Location};

// language=sql
const COLUMNS: &str =
    "id, name, latitude, longitude, country, region, is_favorite, created_at, updated_at";

pub struct Locations<'a>(pub &'a mut SqliteConnection);

impl Locations<'_> {
    /// Insert the candidate or refresh the row sharing its rounded coordinates.
    ///
    /// A coordinate placeholder name never overwrites a stored name, and the
    /// favorite flag survives re-resolution.
    #[instrument(skip_all, fields(name = candidate.name, lat = candidate.latitude, lon = candidate.longitude))]
    pub async fn upsert(&mut self, candidate: &Candidate, now: DateTime<Utc>) -> Result<Location> {
        let query = format!(
            // language=sql
            "
            INSERT INTO locations (name, latitude, longitude, lat_key, lon_key, country, region, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            ON CONFLICT (lat_key, lon_key) DO UPDATE SET
                name = CASE WHEN ?9 THEN locations.name ELSE excluded.name END,
                country = COALESCE(excluded.country, locations.country),
                region = COALESCE(excluded.region, locations.region),
                updated_at = excluded.updated_at
            RETURNING {COLUMNS}
            "
        );
        let (lat_key, lon_key) = candidate.coordinate_key();
        sqlx::query_as(&query)
            .bind(&candidate.name)
            .bind(candidate.latitude)
            .bind(candidate.longitude)
            .bind(lat_key)
            .bind(lon_key)
            .bind(&candidate.country)
            .bind(&candidate.region)
            .bind(now)
            .bind(candidate.is_unnamed())
            .fetch_one(&mut *self.0)
            .await
            .context("failed to upsert the location")
    }

    #[instrument(skip_all, fields(id = id))]
    pub async fn get(&mut self, id: i64) -> Result<Option<Location>> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM locations WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *self.0)
            .await
            .context("failed to fetch the location")
    }

    /// The stored location within ~1 km of the coordinates
    #[instrument(skip_all, fields(lat = latitude, lon = longitude))]
    pub async fn find_by_coordinates(&mut self, latitude: f64, longitude: f64) -> Result<Option<Location>> {
        let (lat_key, lon_key) = coordinate_key(latitude, longitude);
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM locations WHERE lat_key = ?1 AND lon_key = ?2"
        ))
        .bind(lat_key)
        .bind(lon_key)
        .fetch_optional(&mut *self.0)
        .await
        .context("failed to look up the location by coordinates")
    }

    /// Most recently used locations first
    pub async fn all(&mut self, limit: u32) -> Result<Vec<Location>> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM locations ORDER BY updated_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&mut *self.0)
        .await
        .context("failed to list locations")
    }

    pub async fn favorites(&mut self) -> Result<Vec<Location>> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM locations WHERE is_favorite ORDER BY name COLLATE NOCASE"
        ))
        .fetch_all(&mut *self.0)
        .await
        .context("failed to list favorite locations")
    }

    /// Case-insensitive substring match over name, region and country
    #[instrument(skip_all, fields(text = text))]
    pub async fn search(&mut self, text: &str, limit: u32) -> Result<Vec<Location>> {
        let pattern = format!("%{}%", text.trim());
        sqlx::query_as(&format!(
            // language=sql
            "
            SELECT {COLUMNS} FROM locations
            WHERE name LIKE ?1 OR region LIKE ?1 OR country LIKE ?1
            ORDER BY is_favorite DESC, name COLLATE NOCASE
            LIMIT ?2
            "
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&mut *self.0)
        .await
        .context("failed to search locations")
    }

    /// Flip the favorite flag; `None` if there is no such location
    #[instrument(skip_all, fields(id = id))]
    pub async fn toggle_favorite(&mut self, id: i64) -> Result<Option<Location>> {
        sqlx::query_as(&format!(
            "UPDATE locations SET is_favorite = NOT is_favorite WHERE id = ?1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *self.0)
        .await
        .context("failed to toggle the favorite flag")
    }

    pub async fn count(&mut self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(&mut *self.0)
            .await
            .context("failed to count locations")
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::db::Db;

    fn london_uk() -> Candidate {
        Candidate {
            provider_id: Some(2_801_268),
            name: "London".to_string(),
            region: Some("City of London, Greater London".to_string()),
            country: Some("United Kingdom".to_string()),
            latitude: 51.52,
            longitude: -0.11,
            url: None,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_coordinates() -> Result<()> {
        let db = Db::try_new(Path::new(":memory:")).await?;
        let mut connection = db.connection().await;
        let mut locations = Locations(&mut connection);

        let first = locations.upsert(&london_uk(), Utc::now()).await?;
        let mut nearby = london_uk();
        nearby.latitude = 51.5201;
        nearby.longitude = -0.1099;
        let second = locations.upsert(&nearby, Utc::now()).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(locations.count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn placeholder_name_does_not_overwrite() -> Result<()> {
        let db = Db::try_new(Path::new(":memory:")).await?;
        let mut connection = db.connection().await;
        let mut locations = Locations(&mut connection);

        locations.upsert(&london_uk(), Utc::now()).await?;
        let placeholder = Candidate::from_coordinates(51.52, -0.11);
        let location = locations.upsert(&placeholder, Utc::now()).await?;

        assert_eq!(location.name, "London");
        assert_eq!(location.country.as_deref(), Some("United Kingdom"));
        Ok(())
    }

    #[tokio::test]
    async fn favorites_toggle_and_survive_upsert() -> Result<()> {
        let db = Db::try_new(Path::new(":memory:")).await?;
        let mut connection = db.connection().await;
        let mut locations = Locations(&mut connection);

        let london = locations.upsert(&london_uk(), Utc::now()).await?;
        assert!(!london.is_favorite);

        let toggled = locations.toggle_favorite(london.id).await?.unwrap();
        assert!(toggled.is_favorite);
        let again = locations.upsert(&london_uk(), Utc::now()).await?;
        assert!(again.is_favorite);
        assert_eq!(locations.favorites().await?.len(), 1);

        let toggled = locations.toggle_favorite(london.id).await?.unwrap();
        assert!(!toggled.is_favorite);
        assert!(locations.favorites().await?.is_empty());
        assert!(locations.toggle_favorite(999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn search_and_lookup() -> Result<()> {
        let db = Db::try_new(Path::new(":memory:")).await?;
        let mut connection = db.connection().await;
        let mut locations = Locations(&mut connection);

        let london = locations.upsert(&london_uk(), Utc::now()).await?;
        let mut ontario = london_uk();
        ontario.region = Some("Ontario".to_string());
        ontario.country = Some("Canada".to_string());
        ontario.latitude = 42.98;
        ontario.longitude = -81.25;
        locations.upsert(&ontario, Utc::now()).await?;

        assert_eq!(locations.search("lond", 10).await?.len(), 2);
        assert_eq!(locations.search("canada", 10).await?.len(), 1);
        assert!(locations.search("paris", 10).await?.is_empty());

        let found = locations.find_by_coordinates(51.5201, -0.11).await?.unwrap();
        assert_eq!(found.id, london.id);
        assert_eq!(locations.get(london.id).await?.unwrap().name, "London");
        assert_eq!(locations.all(1).await?.len(), 1);
        Ok(())
    }
}
