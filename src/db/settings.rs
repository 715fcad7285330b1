use sqlx::SqliteConnection;
use tracing::instrument;

use super::DbContext;
use crate::Result;
use crate::models::UserSettings;

// language=sql
const COLUMNS: &str =
    "temperature_unit, forecast_days, default_location_id, save_history, max_history_days";

/// The singleton preferences row (`id = 1`)
pub struct Settings<'a>(pub &'a mut SqliteConnection);

impl Settings<'_> {
    /// Read the settings, seeding the row with `defaults` on first use
    #[instrument(skip_all)]
    pub async fn get(&mut self, defaults: &UserSettings) -> Result<UserSettings> {
        sqlx::query(
            // language=sql
            "
            INSERT INTO user_settings (id, temperature_unit, forecast_days, default_location_id, save_history, max_history_days)
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(defaults.temperature_unit)
        .bind(defaults.forecast_days)
        .bind(defaults.default_location_id)
        .bind(defaults.save_history)
        .bind(defaults.max_history_days)
        .execute(&mut *self.0)
        .await
        .context("failed to seed the settings")?;

        sqlx::query_as(&format!("SELECT {COLUMNS} FROM user_settings WHERE id = 1"))
            .fetch_one(&mut *self.0)
            .await
            .context("failed to read the settings")
    }

    #[instrument(skip_all, fields(unit = %settings.temperature_unit, days = settings.forecast_days))]
    pub async fn update(&mut self, settings: &UserSettings) -> Result<UserSettings> {
        sqlx::query_as(&format!(
            // language=sql
            "
            INSERT INTO user_settings (id, temperature_unit, forecast_days, default_location_id, save_history, max_history_days)
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                temperature_unit = excluded.temperature_unit,
                forecast_days = excluded.forecast_days,
                default_location_id = excluded.default_location_id,
                save_history = excluded.save_history,
                max_history_days = excluded.max_history_days
            RETURNING {COLUMNS}
            "
        ))
        .bind(settings.temperature_unit)
        .bind(settings.forecast_days)
        .bind(settings.default_location_id)
        .bind(settings.save_history)
        .bind(settings.max_history_days)
        .fetch_one(&mut *self.0)
        .await
        .context("failed to update the settings")
    }
}
