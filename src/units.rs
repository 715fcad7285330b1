//! Unit systems and display-time conversion
//!
//! Provider data is normalized to metric values when it is parsed. Conversion
//! to the caller's preferred system only happens when a value is rendered.

use crate::WeatherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KPH_TO_MPH: f64 = 0.621_371;
const MM_PER_INCH: f64 = 25.4;
const MB_TO_INHG: f64 = 0.029_53;
const KM_TO_MILES: f64 = 0.621_371;

/// Measurement system used for rendering weather values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UnitSystem {
    /// °C, km/h, mm, mb, km (the provider-native system)
    #[default]
    Metric,
    /// °F, mph, in, inHg, miles
    Imperial,
}

impl UnitSystem {
    #[must_use]
    pub fn temperature(self, celsius: f64) -> f64 {
        match self {
            Self::Metric => celsius,
            Self::Imperial => celsius_to_fahrenheit(celsius),
        }
    }

    #[must_use]
    pub fn speed(self, kph: f64) -> f64 {
        match self {
            Self::Metric => kph,
            Self::Imperial => kph * KPH_TO_MPH,
        }
    }

    #[must_use]
    pub fn precipitation(self, mm: f64) -> f64 {
        match self {
            Self::Metric => mm,
            Self::Imperial => mm / MM_PER_INCH,
        }
    }

    #[must_use]
    pub fn pressure(self, mb: f64) -> f64 {
        match self {
            Self::Metric => mb,
            Self::Imperial => mb * MB_TO_INHG,
        }
    }

    #[must_use]
    pub fn distance(self, km: f64) -> f64 {
        match self {
            Self::Metric => km,
            Self::Imperial => km * KM_TO_MILES,
        }
    }

    #[must_use]
    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    #[must_use]
    pub fn speed_label(self) -> &'static str {
        match self {
            Self::Metric => "km/h",
            Self::Imperial => "mph",
        }
    }

    #[must_use]
    pub fn precipitation_label(self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }

    #[must_use]
    pub fn pressure_label(self) -> &'static str {
        match self {
            Self::Metric => "mb",
            Self::Imperial => "inHg",
        }
    }

    #[must_use]
    pub fn distance_label(self) -> &'static str {
        match self {
            Self::Metric => "km",
            Self::Imperial => "mi",
        }
    }

    /// Single-letter form used in query strings (`?unit=C`)
    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Self::Metric => "C",
            Self::Imperial => "F",
        }
    }

    /// Format a Celsius value in this system, e.g. `21.5°F`
    #[must_use]
    pub fn format_temperature(self, celsius: f64) -> String {
        format!("{:.1}{}", self.temperature(celsius), self.temperature_symbol())
    }

    #[must_use]
    pub fn format_speed(self, kph: f64) -> String {
        format!("{:.1} {}", self.speed(kph), self.speed_label())
    }

    #[must_use]
    pub fn format_precipitation(self, mm: f64) -> String {
        match self {
            Self::Metric => format!("{:.1} {}", mm, self.precipitation_label()),
            Self::Imperial => format!("{:.2} {}", self.precipitation(mm), self.precipitation_label()),
        }
    }

    #[must_use]
    pub fn format_pressure(self, mb: f64) -> String {
        match self {
            Self::Metric => format!("{:.0} {}", mb, self.pressure_label()),
            Self::Imperial => format!("{:.2} {}", self.pressure(mb), self.pressure_label()),
        }
    }
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" | "metric" => Ok(Self::Metric),
            "f" | "fahrenheit" | "imperial" => Ok(Self::Imperial),
            other => Err(WeatherError::validation(format!(
                "Unknown unit '{other}'. Use C or F"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-40.0)]
    #[case(0.0)]
    #[case(21.3)]
    #[case(100.0)]
    fn metric_is_identity(#[case] value: f64) {
        let unit = UnitSystem::Metric;
        assert_eq!(unit.temperature(value), value);
        assert_eq!(unit.speed(value), value);
        assert_eq!(unit.precipitation(value), value);
        assert_eq!(unit.pressure(value), value);
        assert_eq!(unit.distance(value), value);
    }

    #[rstest]
    #[case(0.0, 32.0)]
    #[case(100.0, 212.0)]
    #[case(-40.0, -40.0)]
    #[case(37.0, 98.6)]
    fn imperial_temperature_is_linear(#[case] celsius: f64, #[case] fahrenheit: f64) {
        let converted = UnitSystem::Imperial.temperature(celsius);
        assert!((converted - fahrenheit).abs() < 1e-9, "{converted} != {fahrenheit}");
    }

    #[test]
    fn imperial_other_quantities() {
        let unit = UnitSystem::Imperial;
        assert!((unit.speed(100.0) - 62.1371).abs() < 1e-6);
        assert!((unit.precipitation(25.4) - 1.0).abs() < 1e-9);
        assert!((unit.pressure(1013.0) - 29.913_89).abs() < 1e-4);
        assert!((unit.distance(10.0) - 6.21371).abs() < 1e-6);
    }

    #[rstest]
    #[case("C", UnitSystem::Metric)]
    #[case("celsius", UnitSystem::Metric)]
    #[case("metric", UnitSystem::Metric)]
    #[case("f", UnitSystem::Imperial)]
    #[case("Fahrenheit", UnitSystem::Imperial)]
    #[case(" imperial ", UnitSystem::Imperial)]
    fn parses_unit_names(#[case] input: &str, #[case] expected: UnitSystem) {
        assert_eq!(input.parse::<UnitSystem>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_unit() {
        let err = "kelvin".parse::<UnitSystem>().unwrap_err();
        assert!(err.to_string().contains("kelvin"));
    }

    #[test]
    fn formats_with_symbols() {
        assert_eq!(UnitSystem::Metric.format_temperature(20.0), "20.0°C");
        assert_eq!(UnitSystem::Imperial.format_temperature(20.0), "68.0°F");
        assert_eq!(UnitSystem::Imperial.format_speed(10.0), "6.2 mph");
        assert_eq!(UnitSystem::Metric.format_pressure(1013.4), "1013 mb");
    }
}
