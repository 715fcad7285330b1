//! User preferences stored as a single row

use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Forecast lengths the provider accepts
pub const MIN_FORECAST_DAYS: u8 = 1;
pub const MAX_FORECAST_DAYS: u8 = 7;

/// Clamp a requested forecast length into the supported range
#[must_use]
pub fn clamp_forecast_days(days: i64) -> u8 {
    let clamped = days.clamp(i64::from(MIN_FORECAST_DAYS), i64::from(MAX_FORECAST_DAYS));
    u8::try_from(clamped).unwrap_or(MAX_FORECAST_DAYS)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct UserSettings {
    pub temperature_unit: UnitSystem,
    pub forecast_days: i64,
    pub default_location_id: Option<i64>,
    pub save_history: bool,
    pub max_history_days: i64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            temperature_unit: UnitSystem::Metric,
            forecast_days: i64::from(MAX_FORECAST_DAYS),
            default_location_id: None,
            save_history: true,
            max_history_days: 7,
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn forecast_days(&self) -> u8 {
        clamp_forecast_days(self.forecast_days)
    }

    /// Overlay the fields set in `patch`
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(unit) = patch.temperature_unit {
            self.temperature_unit = unit;
        }
        if let Some(days) = patch.forecast_days {
            self.forecast_days = i64::from(clamp_forecast_days(i64::from(days)));
        }
        if let Some(default_location_id) = patch.default_location_id {
            self.default_location_id = default_location_id;
        }
        if let Some(save_history) = patch.save_history {
            self.save_history = save_history;
        }
        if let Some(max_history_days) = patch.max_history_days {
            self.max_history_days = i64::from(max_history_days.max(1));
        }
    }
}

/// Partial settings update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub temperature_unit: Option<UnitSystem>,
    pub forecast_days: Option<u8>,
    /// `Some(None)` clears the default location
    pub default_location_id: Option<Option<i64>>,
    pub save_history: Option<bool>,
    pub max_history_days: Option<u32>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
