//! Resolution and retrieval pipeline
//!
//! Ties the resolver, the provider and the database together: resolve a
//! query, persist the chosen location, fetch weather once, append a history
//! record and hand back a normalized result. Both the CLI and the web UI go
//! through [`WeatherService`].

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::api::WeatherProvider;
use crate::config::AppConfig;
use crate::db::{Db, Locations, Settings, WeatherRecords};
use crate::location_resolver::{LocationResolver, Resolution};
use crate::models::settings::{MAX_FORECAST_DAYS, clamp_forecast_days};
use crate::models::{
    Candidate, Location, NewWeatherRecord, SettingsPatch, UserSettings, WeatherRecord, WeatherReport,
};
use crate::query::{
    DateExpression, DateRange, Interpretation, LocationParser, QueryInterpreter, normalize_location_name,
};
use crate::units::UnitSystem;
use crate::{Result, WeatherError};

/// Per-call overrides; `None` falls back to the stored settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRequest {
    pub unit: Option<UnitSystem>,
    /// Forecast days, clamped to 1-7
    pub days: Option<u8>,
    /// Restrict the forecast to these days
    pub range: Option<DateRange>,
    /// Relative dates behind `range`, re-resolved against the location's own date
    pub dates: Option<DateExpression>,
    /// 1-based pick among ambiguous candidates
    pub select: Option<usize>,
}

/// A completed lookup
#[derive(Debug, Clone, Serialize)]
pub struct WeatherResult {
    pub location: Location,
    pub report: WeatherReport,
    /// Unit the result should be rendered in
    pub unit: UnitSystem,
    pub range: Option<DateRange>,
    /// History row written for this lookup, if history is enabled
    pub record: Option<WeatherRecord>,
    pub interpretation: Option<Interpretation>,
    /// Message to show alongside the result, e.g. an assumed date
    pub notice: Option<String>,
}

/// Outcome of a lookup by query
#[derive(Debug, Clone, Serialize)]
pub enum Lookup {
    Weather(Box<WeatherResult>),
    /// More than one location matched; the caller has to pick
    Disambiguate {
        query: String,
        candidates: Vec<Candidate>,
        interpretation: Option<Interpretation>,
    },
}

/// Counts and settings for the diagnostics command
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub locations: i64,
    pub favorites: usize,
    pub weather_records: i64,
    pub settings: UserSettings,
}

pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    db: Db,
    default_settings: UserSettings,
    auto_select_first: bool,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, db: Db) -> Self {
        Self {
            provider,
            db,
            default_settings: UserSettings::default(),
            auto_select_first: false,
        }
    }

    /// Seed new settings rows and the auto-select policy from configuration
    pub fn with_config(mut self, config: &AppConfig) -> anyhow::Result<Self> {
        self.default_settings.temperature_unit = config.default_unit()?;
        self.default_settings.forecast_days = i64::from(clamp_forecast_days(i64::from(
            config.defaults.forecast_days,
        )));
        self.auto_select_first = config.defaults.auto_select_first;
        Ok(self)
    }

    /// Resolve a location query without fetching weather
    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        LocationResolver::resolve(self.provider.as_ref(), query, self.auto_select_first).await
    }

    /// Raw provider candidates for a query
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::QueryEmpty);
        }
        if let Ok((latitude, longitude)) = LocationParser::parse_coordinates(query) {
            return Ok(vec![Candidate::from_coordinates(latitude, longitude)]);
        }
        self.provider.search(&normalize_location_name(query)).await
    }

    /// Resolve `query` and fetch weather, or return the candidates to choose from
    #[instrument(skip(self, request))]
    pub async fn weather(&self, query: &str, request: &WeatherRequest) -> Result<Lookup> {
        let candidate = match (self.resolve(query).await?, request.select) {
            (Resolution::Selected(candidate), _) => candidate,
            (resolution, Some(position)) => resolution.select(position)?,
            (Resolution::Ambiguous(candidates), None) => {
                info!("'{}' needs disambiguation ({} candidates)", query, candidates.len());
                return Ok(Lookup::Disambiguate {
                    query: query.trim().to_string(),
                    candidates,
                    interpretation: None,
                });
            }
        };

        let result = self.weather_for_candidate(&candidate, request).await?;
        Ok(Lookup::Weather(Box::new(result)))
    }

    /// Fetch weather for raw coordinates, reusing a stored name if there is one
    pub async fn weather_for_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        request: &WeatherRequest,
    ) -> Result<WeatherResult> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::validation(format!(
                "Coordinates out of range: {latitude}, {longitude}"
            )));
        }

        let stored = {
            let mut connection = self.db.connection().await;
            Locations(&mut connection)
                .find_by_coordinates(latitude, longitude)
                .await?
        };
        let candidate = stored.as_ref().map_or_else(
            || Candidate::from_coordinates(latitude, longitude),
            Candidate::from,
        );
        self.weather_for_candidate(&candidate, request).await
    }

    /// Fetch weather for `candidate` once, then persist it and record history
    #[instrument(skip_all, fields(name = %candidate.name, lat = candidate.latitude, lon = candidate.longitude))]
    pub async fn weather_for_candidate(
        &self,
        candidate: &Candidate,
        request: &WeatherRequest,
    ) -> Result<WeatherResult> {
        let settings = self.settings().await?;
        let unit = request.unit.unwrap_or(settings.temperature_unit);
        let days = requested_days(request, &settings, Local::now().date_naive());

        let mut report = self
            .provider
            .forecast(candidate.latitude, candidate.longitude, days)
            .await?;

        // Relative dates count from the location's calendar, which may be a day off ours
        let range = match (request.dates, report.local_date()) {
            (Some(dates), Some(local_today)) => Some(forecast_window(dates.resolve(local_today), local_today)?),
            _ => request.range,
        };

        let candidate = if candidate.is_unnamed() && !report.location.name.is_empty() {
            debug!("Naming {} after the provider: {}", candidate.name, report.location.name);
            Candidate {
                provider_id: candidate.provider_id,
                name: report.location.name.clone(),
                region: non_empty(&report.location.region),
                country: non_empty(&report.location.country),
                latitude: candidate.latitude,
                longitude: candidate.longitude,
                url: candidate.url.clone(),
            }
        } else {
            candidate.clone()
        };

        let now = Utc::now();
        let mut connection = self.db.connection().await;
        let location = Locations(&mut connection).upsert(&candidate, now).await?;
        let record = if settings.save_history {
            let record = NewWeatherRecord::from_current(location.id, &report.current, now);
            Some(WeatherRecords(&mut connection).insert(&record).await?)
        } else {
            None
        };
        drop(connection);

        if let Some(range) = range {
            report.restrict_to(&range);
        }

        info!(
            "Weather for {}: {:.1}°C, {}",
            location.display_name(),
            report.current.temperature_c,
            report.current.condition.text
        );

        Ok(WeatherResult {
            location,
            report,
            unit,
            range,
            record,
            interpretation: None,
            notice: None,
        })
    }

    /// Answer a natural-language phrase such as "weather in Paris next friday"
    pub async fn ask(&self, phrase: &str, request: &WeatherRequest) -> Result<Lookup> {
        self.ask_on(phrase, request, Local::now().date_naive()).await
    }

    /// [`Self::ask`] with an explicit "today"
    #[instrument(skip(self, request))]
    pub async fn ask_on(&self, phrase: &str, request: &WeatherRequest, today: NaiveDate) -> Result<Lookup> {
        let interpretation = QueryInterpreter::interpret(phrase)?;
        if interpretation.date_defaulted() {
            warn!("No date recognized in '{}', assuming today", phrase);
        }
        let request = ask_request(&interpretation, request, today)?;

        let lookup = match &interpretation.location {
            Some(location) => self.weather(location, &request).await?,
            None => {
                let location = self.default_location().await?.ok_or_else(|| {
                    WeatherError::validation(format!(
                        "No location found in '{}' and no default location is set",
                        phrase.trim()
                    ))
                })?;
                let result = self
                    .weather_for_candidate(&Candidate::from(&location), &request)
                    .await?;
                Lookup::Weather(Box::new(result))
            }
        };

        Ok(match lookup {
            Lookup::Weather(mut result) => {
                annotate(&mut result, interpretation);
                Lookup::Weather(result)
            }
            Lookup::Disambiguate {
                query, candidates, ..
            } => Lookup::Disambiguate {
                query,
                candidates,
                interpretation: Some(interpretation),
            },
        })
    }

    /// Finish an [`Self::ask`] that stopped at disambiguation
    pub async fn ask_with_candidate(
        &self,
        candidate: &Candidate,
        interpretation: Interpretation,
        request: &WeatherRequest,
    ) -> Result<WeatherResult> {
        let request = ask_request(&interpretation, request, Local::now().date_naive())?;
        let mut result = self.weather_for_candidate(candidate, &request).await?;
        annotate(&mut result, interpretation);
        Ok(result)
    }

    pub async fn location(&self, id: i64) -> Result<Location> {
        let mut connection = self.db.connection().await;
        Locations(&mut connection)
            .get(id)
            .await?
            .ok_or_else(|| WeatherError::not_found(format!("location #{id}")))
    }

    pub async fn saved_locations(&self, limit: u32) -> Result<Vec<Location>> {
        let mut connection = self.db.connection().await;
        Locations(&mut connection).all(limit).await
    }

    /// Stored locations matching `text` by name, region or country
    pub async fn search_saved(&self, text: &str, limit: u32) -> Result<Vec<Location>> {
        let mut connection = self.db.connection().await;
        Locations(&mut connection).search(text, limit).await
    }

    pub async fn favorites(&self) -> Result<Vec<Location>> {
        let mut connection = self.db.connection().await;
        Locations(&mut connection).favorites().await
    }

    pub async fn toggle_favorite(&self, id: i64) -> Result<Location> {
        let mut connection = self.db.connection().await;
        let location = Locations(&mut connection)
            .toggle_favorite(id)
            .await?
            .ok_or_else(|| WeatherError::not_found(format!("location #{id}")))?;
        info!(
            "{} {} favorites",
            location.display_name(),
            if location.is_favorite { "added to" } else { "removed from" }
        );
        Ok(location)
    }

    /// Records for a location within the configured history window, newest first
    pub async fn history(&self, location_id: i64, limit: u32) -> Result<(Location, Vec<WeatherRecord>)> {
        let settings = self.settings().await?;
        let location = self.location(location_id).await?;
        let since = Utc::now() - Duration::days(settings.max_history_days.max(1));
        let mut connection = self.db.connection().await;
        let records = WeatherRecords(&mut connection)
            .for_location(location_id, Some(since), limit)
            .await?;
        Ok((location, records))
    }

    pub async fn settings(&self) -> Result<UserSettings> {
        let mut connection = self.db.connection().await;
        Settings(&mut connection).get(&self.default_settings).await
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<UserSettings> {
        if let Some(Some(id)) = patch.default_location_id {
            self.location(id).await?;
        }
        let mut settings = self.settings().await?;
        settings.apply(patch);
        let mut connection = self.db.connection().await;
        Settings(&mut connection).update(&settings).await
    }

    async fn default_location(&self) -> Result<Option<Location>> {
        match self.settings().await?.default_location_id {
            Some(id) => {
                let mut connection = self.db.connection().await;
                Locations(&mut connection).get(id).await
            }
            None => Ok(None),
        }
    }

    pub async fn diagnostics(&self) -> Result<Diagnostics> {
        let settings = self.settings().await?;
        let favorites = self.favorites().await?.len();
        let mut connection = self.db.connection().await;
        Ok(Diagnostics {
            locations: Locations(&mut connection).count().await?,
            favorites,
            weather_records: WeatherRecords(&mut connection).count().await?,
            settings,
        })
    }

    /// Check the provider with a known query
    pub async fn check_provider(&self) -> Result<usize> {
        Ok(self.provider.search("London").await?.len())
    }
}

/// Validate a requested range against the forecast horizon, trimming its tail
pub fn forecast_window(range: DateRange, today: NaiveDate) -> Result<DateRange> {
    let last = today + Duration::days(i64::from(MAX_FORECAST_DAYS) - 1);
    if range.start < today {
        return Err(WeatherError::validation("Cannot forecast for past dates"));
    }
    if range.start > last {
        return Err(WeatherError::validation(format!(
            "Cannot forecast more than {MAX_FORECAST_DAYS} days ahead"
        )));
    }
    Ok(DateRange::new(range.start, range.end.min(last)))
}

/// Request covering the interpreted dates, rejected when they fall outside the horizon
fn ask_request(interpretation: &Interpretation, request: &WeatherRequest, today: NaiveDate) -> Result<WeatherRequest> {
    let range = forecast_window(interpretation.date_range(today), today)?;
    Ok(WeatherRequest {
        range: Some(range),
        dates: Some(interpretation.date),
        days: Some(forecast_days_for(range, today)),
        ..request.clone()
    })
}

/// An explicit day count still has to reach the end of a requested range
fn requested_days(request: &WeatherRequest, settings: &UserSettings, today: NaiveDate) -> u8 {
    match (request.days, request.range) {
        (Some(days), Some(range)) => clamp_forecast_days(i64::from(days)).max(forecast_days_for(range, today)),
        (Some(days), None) => clamp_forecast_days(i64::from(days)),
        (None, Some(range)) => forecast_days_for(range, today),
        (None, None) => settings.forecast_days(),
    }
}

fn annotate(result: &mut WeatherResult, interpretation: Interpretation) {
    if interpretation.date_defaulted() {
        result.notice = Some("No date recognized, showing today.".to_string());
    }
    result.interpretation = Some(interpretation);
}

/// Days to request so the forecast reaches the end of `range`
fn forecast_days_for(range: DateRange, today: NaiveDate) -> u8 {
    clamp_forecast_days((range.end - today).num_days() + 1)
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
