use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;

use super::DbContext;
use crate::Result;
use crate::models::{NewWeatherRecord, WeatherRecord};

// language=sql
const COLUMNS: &str = "id, location_id, timestamp, temperature, feels_like, humidity, pressure, \
                       wind_speed, wind_direction, condition, condition_description";

/// Append-only weather history
pub struct WeatherRecords<'a>(pub &'a mut SqliteConnection);

impl WeatherRecords<'_> {
    #[instrument(skip_all, fields(location_id = record.location_id))]
    pub async fn insert(&mut self, record: &NewWeatherRecord) -> Result<WeatherRecord> {
        sqlx::query_as(&format!(
            // language=sql
            "
            INSERT INTO weather_records (
                location_id, timestamp, temperature, feels_like, humidity, pressure,
                wind_speed, wind_direction, condition, condition_description
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {COLUMNS}
            "
        ))
        .bind(record.location_id)
        .bind(record.timestamp)
        .bind(record.temperature)
        .bind(record.feels_like)
        .bind(record.humidity)
        .bind(record.pressure)
        .bind(record.wind_speed)
        .bind(&record.wind_direction)
        .bind(&record.condition)
        .bind(&record.condition_description)
        .fetch_one(&mut *self.0)
        .await
        .context("failed to insert the weather record")
    }

    /// Newest first, optionally bounded by `since`
    #[instrument(skip_all, fields(location_id = location_id, limit = limit))]
    pub async fn for_location(
        &mut self,
        location_id: i64,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<WeatherRecord>> {
        sqlx::query_as(&format!(
            // language=sql
            "
            SELECT {COLUMNS} FROM weather_records
            WHERE location_id = ?1 AND (?2 IS NULL OR timestamp >= ?2)
            ORDER BY timestamp DESC, id DESC
            LIMIT ?3
            "
        ))
        .bind(location_id)
        .bind(since)
        .bind(limit)
        .fetch_all(&mut *self.0)
        .await
        .context("failed to list weather records")
    }

    pub async fn count(&mut self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM weather_records")
            .fetch_one(&mut *self.0)
            .await
            .context("failed to count weather records")
    }
}
