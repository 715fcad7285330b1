//! Current weather conditions and display helpers

use serde::{Deserialize, Serialize};

/// Provider condition block (text, icon URL, numeric code)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub code: u32,
}

impl Condition {
    /// Emoji matching the condition text
    #[must_use]
    pub fn emoji(&self) -> &'static str {
        condition_emoji(&self.text)
    }

    /// Icon URL with an explicit scheme; the provider sends protocol-relative URLs
    #[must_use]
    pub fn icon_url(&self) -> Option<String> {
        if self.icon.is_empty() {
            None
        } else if self.icon.starts_with("//") {
            Some(format!("https:{}", self.icon))
        } else {
            Some(self.icon.clone())
        }
    }
}

/// Current conditions at a location, always in metric units
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Local time of the observation as reported by the provider
    pub last_updated: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Feels-like temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Pressure in millibar
    pub pressure_mb: f64,
    /// Wind speed in km/h
    pub wind_kph: f64,
    /// Gust speed in km/h
    pub gust_kph: Option<f64>,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_degree: u16,
    /// Compass direction, e.g. `NNE`
    pub wind_dir: String,
    /// Precipitation in mm
    pub precip_mm: f64,
    /// Cloud cover percentage
    pub cloud: u8,
    pub uv: f64,
    /// Visibility in km
    pub visibility_km: Option<f64>,
    pub condition: Condition,
}

impl CurrentConditions {
    /// Convert wind direction from degrees to cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    /// Compass direction, derived from degrees when the provider sent none
    #[must_use]
    pub fn compass(&self) -> &str {
        if self.wind_dir.is_empty() {
            Self::wind_direction_to_cardinal(self.wind_degree)
        } else {
            &self.wind_dir
        }
    }
}

/// Map a free-text condition description to an emoji
#[must_use]
pub fn condition_emoji(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if text.contains("thunder") {
        "⛈️"
    } else if text.contains("snow") || text.contains("sleet") || text.contains("blizzard") {
        "❄️"
    } else if text.contains("rain") || text.contains("drizzle") || text.contains("shower") {
        "🌧️"
    } else if text.contains("fog") || text.contains("mist") {
        "🌫️"
    } else if text.contains("sunny") {
        "☀️"
    } else if text.contains("clear") {
        "🌕"
    } else if text.contains("cloud") || text.contains("overcast") {
        "☁️"
    } else if text.contains("wind") {
        "🌬️"
    } else {
        "🌈"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_wind_direction_to_cardinal() {
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(0), "N");
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(90), "E");
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(180), "S");
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(270), "W");
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(45), "NE");
        assert_eq!(CurrentConditions::wind_direction_to_cardinal(400), "Unknown");
    }

    #[rstest]
    #[case("Sunny", "☀️")]
    #[case("Partly cloudy", "☁️")]
    #[case("Patchy light drizzle", "🌧️")]
    #[case("Thundery outbreaks possible", "⛈️")]
    #[case("Moderate snow", "❄️")]
    #[case("Freezing fog", "🌫️")]
    #[case("Clear", "🌕")]
    #[case("Something else", "🌈")]
    fn test_condition_emoji(#[case] text: &str, #[case] emoji: &str) {
        assert_eq!(condition_emoji(text), emoji);
    }

    #[test]
    fn test_icon_url_adds_scheme() {
        let condition = Condition {
            text: "Sunny".to_string(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".to_string(),
            code: 1000,
        };
        assert_eq!(
            condition.icon_url().as_deref(),
            Some("https://cdn.weatherapi.com/weather/64x64/day/113.png")
        );
        assert_eq!(Condition::default().icon_url(), None);
    }
}
