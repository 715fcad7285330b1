//! Plain-text rendering for the CLI

use chrono::{Local, NaiveDate};

use crate::models::{Candidate, ForecastDay, Location, UserSettings, WeatherRecord};
use crate::service::{Diagnostics, WeatherResult};
use crate::units::UnitSystem;

/// Current conditions block, followed by the notice if there is one
#[must_use]
pub fn current(result: &WeatherResult) -> String {
    let unit = result.unit;
    let now = &result.report.current;
    let mut lines = vec![
        header(result),
        format!(
            "{} {}",
            now.condition.emoji(),
            now.condition.text
        ),
        format!(
            "🌡️  Temperature: {} (feels like {})",
            unit.format_temperature(now.temperature_c),
            unit.format_temperature(now.feels_like_c)
        ),
        format!("💧 Humidity: {}%", now.humidity),
        format!(
            "🌬️  Wind: {} {}",
            unit.format_speed(now.wind_kph),
            now.compass()
        ),
    ];
    if let Some(gust) = now.gust_kph {
        lines.push(format!("   Gusts: {}", unit.format_speed(gust)));
    }
    lines.push(format!("🔽 Pressure: {}", unit.format_pressure(now.pressure_mb)));
    lines.push(format!(
        "☔ Precipitation: {}",
        unit.format_precipitation(now.precip_mm)
    ));
    lines.push(format!("☁️  Cloud cover: {}%", now.cloud));
    if let Some(visibility) = now.visibility_km {
        lines.push(format!(
            "👁️  Visibility: {:.1} {}",
            unit.distance(visibility),
            unit.distance_label()
        ));
    }
    lines.push(format!("🔆 UV index: {:.1}", now.uv));
    lines.push(format!("Last updated: {}", now.last_updated));
    push_notice(&mut lines, result);
    lines.join("\n")
}

/// Daily forecast rows for the days left in the result
#[must_use]
pub fn forecast(result: &WeatherResult) -> String {
    let today = Local::now().date_naive();
    let mut lines = vec![header(result)];
    if let Some(range) = result.range {
        let days = range.len_days();
        let noun = if days == 1 { "day" } else { "days" };
        lines.push(format!("Dates: {range} ({days} {noun})"));
    }
    if result.report.forecast.is_empty() {
        lines.push("No forecast data for the requested dates.".to_string());
    }
    for day in &result.report.forecast {
        lines.push(String::new());
        lines.extend(forecast_day(day, result.unit, today));
    }
    push_notice(&mut lines, result);
    lines.join("\n")
}

fn forecast_day(day: &ForecastDay, unit: UnitSystem, today: NaiveDate) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {}: {}",
            day.condition.emoji(),
            day_name(day.date, today),
            day.condition.text
        ),
        format!(
            "   🌡️  {} / {} (avg {})",
            unit.format_temperature(day.max_temp_c),
            unit.format_temperature(day.min_temp_c),
            unit.format_temperature(day.avg_temp_c)
        ),
        format!(
            "   🌬️  Max wind {}, humidity {:.0}%",
            unit.format_speed(day.max_wind_kph),
            day.avg_humidity
        ),
        format!(
            "   ☔ {} ({}% rain, {}% snow)",
            unit.format_precipitation(day.total_precip_mm),
            day.chance_of_rain,
            day.chance_of_snow
        ),
    ];
    if let (Some(sunrise), Some(sunset)) = (&day.sunrise, &day.sunset) {
        lines.push(format!("   🌅 {sunrise}  🌇 {sunset}"));
    }
    lines
}

/// Today, Tomorrow, or the weekday and date
#[must_use]
pub fn day_name(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A, %B %d").to_string(),
    }
}

fn header(result: &WeatherResult) -> String {
    let location = &result.location;
    let star = if location.is_favorite { " ⭐" } else { "" };
    format!(
        "📍 {} ({}){star}",
        location.display_name(),
        location.format_coordinates()
    )
}

fn push_notice(lines: &mut Vec<String>, result: &WeatherResult) {
    if let Some(notice) = &result.notice {
        lines.push(String::new());
        lines.push(format!("ℹ️  {notice}"));
    }
}

/// Numbered candidate list for disambiguation
#[must_use]
pub fn candidates(query: &str, candidates: &[Candidate]) -> String {
    numbered(format!("Multiple locations match '{query}':"), candidates)
}

#[must_use]
pub fn search_results(query: &str, candidates: &[Candidate]) -> String {
    let noun = if candidates.len() == 1 { "location" } else { "locations" };
    numbered(
        format!("Found {} {noun} for '{query}':", candidates.len()),
        candidates,
    )
}

fn numbered(heading: String, candidates: &[Candidate]) -> String {
    let mut lines = vec![heading];
    for (position, candidate) in candidates.iter().enumerate() {
        lines.push(format!(
            "  {}. {} ({:.4}, {:.4})",
            position + 1,
            candidate.display_name(),
            candidate.latitude,
            candidate.longitude
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn locations(title: &str, locations: &[Location]) -> String {
    if locations.is_empty() {
        return format!("{title}: none");
    }
    let mut lines = vec![format!("{title}:")];
    for location in locations {
        let star = if location.is_favorite { "⭐" } else { "  " };
        lines.push(format!(
            "{star} #{:<4} {} ({})",
            location.id,
            location.display_name(),
            location.format_coordinates()
        ));
    }
    lines.join("\n")
}

/// Stored snapshots, newest first
#[must_use]
pub fn history(location: &Location, records: &[WeatherRecord], unit: UnitSystem) -> String {
    let mut lines = vec![format!("History for {}:", location.display_name())];
    if records.is_empty() {
        lines.push("  No records in the history window.".to_string());
    }
    for record in records {
        lines.push(format!(
            "  {}  {:>8}  {} {}  💧{}%  🌬️ {} {}",
            record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            unit.format_temperature(record.temperature),
            crate::models::weather::condition_emoji(&record.condition_description),
            record.condition,
            record.humidity,
            unit.format_speed(record.wind_speed),
            record.wind_direction
        ));
    }
    lines.join("\n")
}

#[must_use]
pub fn settings(settings: &UserSettings) -> String {
    let default_location = settings
        .default_location_id
        .map_or_else(|| "none".to_string(), |id| format!("#{id}"));
    [
        "Settings:".to_string(),
        format!("  Temperature unit: {}", settings.temperature_unit.letter()),
        format!("  Forecast days: {}", settings.forecast_days()),
        format!("  Default location: {default_location}"),
        format!("  Save history: {}", settings.save_history),
        format!("  History window: {} days", settings.max_history_days),
    ]
    .join("\n")
}

#[must_use]
pub fn diagnostics(diagnostics: &Diagnostics) -> String {
    [
        format!("Locations: {}", diagnostics.locations),
        format!("Favorites: {}", diagnostics.favorites),
        format!("Weather records: {}", diagnostics.weather_records),
        self::settings(&diagnostics.settings),
    ]
    .join("\n")
}
