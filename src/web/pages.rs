//! HTML pages rendered with maud

use chrono::Local;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::WeatherError;
use crate::display::day_name;
use crate::models::{Candidate, ForecastDay, Location};
use crate::service::WeatherResult;
use crate::units::UnitSystem;

// language=css
const STYLE: &str = "
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
header a { color: inherit; text-decoration: none; }
form.inline { display: inline; }
.flash { padding: .75rem 1rem; border-radius: .25rem; margin: 1rem 0; }
.flash.warning { background: #fff4d6; }
.flash.error { background: #fde2e1; }
.notice { color: #555; font-style: italic; }
.day { border-top: 1px solid #ddd; padding: .5rem 0; }
.muted { color: #777; font-size: .9rem; }
ul.locations { list-style: none; padding: 0; }
";

/// Message shown above the page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    /// `warning` or `error`
    pub kind: &'static str,
    pub message: String,
}

impl From<&WeatherError> for Flash {
    fn from(error: &WeatherError) -> Self {
        let kind = match error {
            WeatherError::QueryEmpty
            | WeatherError::LocationNotFound { .. }
            | WeatherError::LocationAmbiguous { .. }
            | WeatherError::Validation { .. }
            | WeatherError::ProviderRateLimited { .. } => "warning",
            _ => "error",
        };
        Self {
            kind,
            message: error.user_message(),
        }
    }
}

/// Which part of a result a page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Current,
    Forecast,
}

fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · weatherdash" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header { h1 { a href="/" { "🌦️ weatherdash" } } }
                main { (content) }
            }
        }
    }
}

fn flash(flash: Option<&Flash>) -> Markup {
    html! {
        @if let Some(flash) = flash {
            div class={ "flash " (flash.kind) } role="alert" { (flash.message) }
        }
    }
}

fn weather_href(latitude: f64, longitude: f64) -> String {
    format!("/weather/{latitude}/{longitude}")
}

fn favorite_button(location: &Location, next: &str) -> Markup {
    html! {
        form.inline method="post" action={ "/favorite/" (location.id) } {
            input type="hidden" name="next" value=(next);
            button type="submit" {
                @if location.is_favorite { "★ Unfavorite" } @else { "☆ Favorite" }
            }
        }
    }
}

fn location_list(locations: &[Location]) -> Markup {
    html! {
        ul.locations {
            @for location in locations {
                li {
                    a href=(weather_href(location.latitude, location.longitude)) { (location.display_name()) }
                    " "
                    (favorite_button(location, "/"))
                }
            }
        }
    }
}

pub fn index(
    favorites: &[Location],
    recent: &[Location],
    unit: UnitSystem,
    message: Option<&Flash>,
    query: &str,
) -> Markup {
    let unit_option = |value: UnitSystem, label: &str| {
        html! {
            option value=(value.letter()) selected[value == unit] { (label) }
        }
    };
    layout(
        "Weather",
        html! {
            (flash(message))
            form method="post" action="/search" {
                input type="text" name="q" value=(query) placeholder="City, postal code, lat,lon or a question" autofocus;
                " "
                select name="mode" {
                    option value="name" { "Location" }
                    option value="ask" { "Question" }
                }
                " "
                select name="unit" {
                    (unit_option(UnitSystem::Metric, "°C"))
                    (unit_option(UnitSystem::Imperial, "°F"))
                }
                " "
                button type="submit" { "Search" }
            }
            p.muted { "Try \"London\", \"90210\", \"51.5074,-0.1278\" or \"weather in Paris this weekend\"." }

            h2 { "⭐ Favorites" }
            @if favorites.is_empty() {
                p.muted { "No favorites yet." }
            } @else {
                (location_list(favorites))
            }

            h2 { "Recent locations" }
            @if recent.is_empty() {
                p.muted { "Nothing searched yet." }
            } @else {
                (location_list(recent))
            }
        },
    )
}

/// Disambiguation page; `suffix` is appended to every candidate link
pub fn candidates(query: &str, candidates: &[Candidate], suffix: &str) -> Markup {
    layout(
        "Choose a location",
        html! {
            h2 { "Multiple locations match “" (query) "”" }
            ol {
                @for candidate in candidates {
                    li {
                        a href={ (weather_href(candidate.latitude, candidate.longitude)) (suffix) } {
                            (candidate.display_name())
                        }
                        " "
                        span.muted { (format!("({:.4}, {:.4})", candidate.latitude, candidate.longitude)) }
                    }
                }
            }
            p { a href="/" { "← New search" } }
        },
    )
}

pub fn weather(result: &WeatherResult, view: View) -> Markup {
    let location = &result.location;
    let unit = result.unit;
    let here = weather_href(location.latitude, location.longitude);
    let toggle_unit = match unit {
        UnitSystem::Metric => UnitSystem::Imperial,
        UnitSystem::Imperial => UnitSystem::Metric,
    };
    let other_view = match view {
        View::Current => ("forecast", "Show forecast"),
        View::Forecast => ("current", "Show current conditions"),
    };

    layout(
        &location.display_name(),
        html! {
            h2 { "📍 " (location.display_name()) }
            p.muted {
                (location.format_coordinates())
                " "
                (favorite_button(location, &here))
            }
            @if let Some(notice) = &result.notice {
                p.notice { (notice) }
            }
            @if let Some(interpretation) = &result.interpretation {
                p.muted { "Showing " (interpretation.date.to_string()) }
            }
            @match view {
                View::Current => (current(result)),
                View::Forecast => (forecast(result)),
            }
            p {
                a href={ (here) "?display=" (other_view.0) "&unit=" (unit.letter()) } { (other_view.1) }
                " · "
                a href={ (here) "?display=" (match view { View::Current => "current", View::Forecast => "forecast" }) "&unit=" (toggle_unit.letter()) } {
                    "Switch to " (toggle_unit.temperature_symbol())
                }
                " · "
                a href="/" { "New search" }
            }
        },
    )
}

fn current(result: &WeatherResult) -> Markup {
    let unit = result.unit;
    let now = &result.report.current;
    html! {
        section.current {
            p {
                @if let Some(icon) = now.condition.icon_url() {
                    img src=(icon) alt=(now.condition.text) width="64" height="64";
                } @else {
                    span { (now.condition.emoji()) }
                }
                " "
                strong { (unit.format_temperature(now.temperature_c)) }
                " " (now.condition.text)
            }
            ul {
                li { "Feels like " (unit.format_temperature(now.feels_like_c)) }
                li { "💧 Humidity " (now.humidity) "%" }
                li { "🌬️ Wind " (unit.format_speed(now.wind_kph)) " " (now.compass()) }
                @if let Some(gust) = now.gust_kph {
                    li { "Gusts " (unit.format_speed(gust)) }
                }
                li { "Pressure " (unit.format_pressure(now.pressure_mb)) }
                li { "☔ Precipitation " (unit.format_precipitation(now.precip_mm)) }
                li { "☁️ Cloud cover " (now.cloud) "%" }
                li { "🔆 UV " (format!("{:.1}", now.uv)) }
            }
            p.muted { "Last updated " (now.last_updated) }
        }
    }
}

fn forecast(result: &WeatherResult) -> Markup {
    let today = Local::now().date_naive();
    html! {
        section.forecast {
            @if let Some(range) = result.range {
                p.muted { (range.to_string()) }
            }
            @if result.report.forecast.is_empty() {
                p { "No forecast data for the requested dates." }
            }
            @for day in &result.report.forecast {
                (forecast_day(day, result.unit, &day_name(day.date, today)))
            }
        }
    }
}

fn forecast_day(day: &ForecastDay, unit: UnitSystem, name: &str) -> Markup {
    html! {
        div.day {
            h3 { (day.condition.emoji()) " " (name) }
            p {
                strong { (unit.format_temperature(day.max_temp_c)) }
                " / " (unit.format_temperature(day.min_temp_c))
                " · " (day.condition.text)
            }
            p.muted {
                "Wind up to " (unit.format_speed(day.max_wind_kph))
                " · " (unit.format_precipitation(day.total_precip_mm))
                " (" (day.chance_of_rain) "% rain)"
                @if let (Some(sunrise), Some(sunset)) = (&day.sunrise, &day.sunset) {
                    " · 🌅 " (sunrise) " 🌇 " (sunset)
                }
            }
        }
    }
}

/// Bare page for failures that prevent rendering the home page
pub fn error_page(message: &Flash) -> Markup {
    layout(
        "Error",
        html! {
            (flash(Some(message)))
            p { a href="/" { "Back" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_kinds() {
        assert_eq!(Flash::from(&WeatherError::QueryEmpty).kind, "warning");
        assert_eq!(Flash::from(&WeatherError::provider("down")).kind, "error");
    }

    #[test]
    fn index_marks_selected_unit() {
        let page = index(&[], &[], UnitSystem::Imperial, None, "").into_string();
        assert!(page.contains("<option value=\"F\" selected>"));
        assert!(page.contains("No favorites yet."));
    }
}
