//! Query parsing
//!
//! Two layers live here. [`LocationParser`] classifies a plain location query
//! (coordinates, postal code or place name). [`QueryInterpreter`] pulls a
//! location and a relative date out of a free-form phrase such as
//! "what's the weather in Paris this weekend?" and [`DateExpression::resolve`]
//! turns the date part into a concrete [`DateRange`].
//!
//! The interpreter is pattern matching over tokens from a fixed vocabulary,
//! not a grammar.

use crate::{Result, WeatherError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location parsing utilities
pub struct LocationParser;

impl LocationParser {
    /// Parse location input (coordinates, city names, postal codes)
    pub fn parse(input: &str) -> Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(WeatherError::QueryEmpty);
        }

        if let Ok((lat, lon)) = Self::parse_coordinates(input) {
            return Ok(LocationInput::Coordinates(lat, lon));
        }

        if Self::is_postal_code(input) {
            return Ok(LocationInput::PostalCode(input.to_string()));
        }

        Ok(LocationInput::Name(normalize_location_name(input)))
    }

    /// Parse coordinates from string like "51.5074,-0.1278" or "51.5074 -0.1278"
    pub fn parse_coordinates(input: &str) -> Result<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(WeatherError::validation(
                "Coordinates must be in format 'lat,lon'",
            ));
        }

        let lat = parts[0]
            .parse::<f64>()
            .map_err(|_| WeatherError::validation(format!("Invalid latitude: {}", parts[0])))?;
        let lon = parts[1]
            .parse::<f64>()
            .map_err(|_| WeatherError::validation(format!("Invalid longitude: {}", parts[1])))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok((lat, lon))
    }

    /// Check if input looks like a postal code
    fn is_postal_code(input: &str) -> bool {
        let normalized = input.replace([' ', '-'], "");

        // US ZIP codes: 5 or 9 digits
        if normalized.len() == 5 || normalized.len() == 9 {
            return normalized.chars().all(|c| c.is_ascii_digit());
        }

        // Country prefix followed by an alphanumeric code that contains digits
        if normalized.len() >= 5 && normalized.len() <= 10 && normalized.is_ascii() {
            let (prefix, suffix) = normalized.split_at(2);
            return prefix.chars().all(|c| c.is_ascii_alphabetic())
                && suffix.chars().all(|c| c.is_ascii_alphanumeric())
                && suffix.chars().any(|c| c.is_ascii_digit());
        }

        false
    }
}

/// Types of location input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, region, etc.)
    Name(String),
    /// Postal code
    PostalCode(String),
}

/// Expand trailing country abbreviations the provider does not understand
#[must_use]
pub fn normalize_location_name(input: &str) -> String {
    const ABBREVIATIONS: [(&str, &str); 6] = [
        ("uk", "United Kingdom"),
        ("usa", "United States"),
        ("us", "United States"),
        ("u.s", "United States"),
        ("u.s.a", "United States"),
        ("uae", "United Arab Emirates"),
    ];

    let input = input.trim();
    let split_at = input.rfind([',', ' ']).map_or(0, |idx| idx + 1);
    if split_at == 0 {
        return input.to_string();
    }

    let (head, last) = input.split_at(split_at);
    let key = last.trim().trim_end_matches('.').to_lowercase();
    ABBREVIATIONS
        .iter()
        .find(|(abbreviation, _)| *abbreviation == key)
        .map_or_else(
            || input.to_string(),
            |(_, country)| format!("{} {country}", head.trim_end()),
        )
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    #[must_use]
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.format("%a %d %b"))
        } else {
            write!(
                f,
                "{} - {}",
                self.start.format("%a %d %b"),
                self.end.format("%a %d %b")
            )
        }
    }
}

/// A relative or explicit date found in a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateExpression {
    Today,
    Tomorrow,
    ThisWeekend,
    NextWeekend,
    ThisWeek,
    NextWeek,
    /// `next friday`: the first such weekday strictly after today
    Next(Weekday),
    /// `friday` / `on friday`: the next such weekday, today included
    On(Weekday),
    Date(NaiveDate),
}

impl DateExpression {
    /// Resolve to concrete days relative to `today`
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let weekday = i64::from(today.weekday().num_days_from_monday());
        match self {
            Self::Today => DateRange::single(today),
            Self::Tomorrow => DateRange::single(today + Duration::days(1)),
            Self::ThisWeekend => {
                let saturday = this_saturday(today);
                DateRange::new(saturday.max(today), saturday + Duration::days(1))
            }
            Self::NextWeekend => {
                let saturday = this_saturday(today) + Duration::days(7);
                DateRange::new(saturday, saturday + Duration::days(1))
            }
            Self::ThisWeek => DateRange::new(today, today + Duration::days(6 - weekday)),
            Self::NextWeek => {
                let monday = today + Duration::days(7 - weekday);
                DateRange::new(monday, monday + Duration::days(6))
            }
            Self::Next(target) => {
                let ahead = days_until(today.weekday(), target);
                DateRange::single(today + Duration::days(if ahead == 0 { 7 } else { ahead }))
            }
            Self::On(target) => {
                DateRange::single(today + Duration::days(days_until(today.weekday(), target)))
            }
            Self::Date(date) => DateRange::single(date),
        }
    }
}

/// Saturday of the current weekend; yesterday when today is Sunday
fn this_saturday(today: NaiveDate) -> NaiveDate {
    let weekday = i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(5 - weekday)
}

fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let to = i64::from(to.num_days_from_monday());
    (to - from).rem_euclid(7)
}

impl fmt::Display for DateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Tomorrow => write!(f, "tomorrow"),
            Self::ThisWeekend => write!(f, "this weekend"),
            Self::NextWeekend => write!(f, "next weekend"),
            Self::ThisWeek => write!(f, "this week"),
            Self::NextWeek => write!(f, "next week"),
            Self::Next(day) => write!(f, "next {}", weekday_name(*day)),
            Self::On(day) => write!(f, "{}", weekday_name(*day)),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl std::str::FromStr for DateExpression {
    type Err = WeatherError;

    /// Parse a bare date phrase such as "tomorrow" or "next friday"
    fn from_str(input: &str) -> Result<Self> {
        let interpretation = QueryInterpreter::interpret(input)?;
        if interpretation.date_defaulted() || interpretation.location.is_some() {
            return Err(WeatherError::validation(format!(
                "Unrecognized date '{}'",
                input.trim()
            )));
        }
        Ok(interpretation.date)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Full weekday names, plus the short forms when `short` is set
fn parse_weekday(word: &str, short: bool) -> Option<Weekday> {
    let day = match word {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ if !short => return None,
        "mon" => Weekday::Mon,
        "tue" | "tues" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" | "thurs" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Whether the date was stated in the phrase or assumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    Explicit,
    /// Nothing recognizable was found; today was assumed
    Defaulted,
}

/// Result of interpreting a phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub location: Option<String>,
    pub date: DateExpression,
    pub date_source: DateSource,
}

impl Interpretation {
    #[must_use]
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        self.date.resolve(today)
    }

    #[must_use]
    pub fn date_defaulted(&self) -> bool {
        self.date_source == DateSource::Defaulted
    }
}

const PREPOSITIONS: [&str; 4] = ["in", "for", "at", "near"];
const KEYWORDS: [&str; 6] = [
    "weather",
    "forecast",
    "temperature",
    "temp",
    "conditions",
    "outlook",
];
const STOPWORDS: [&str; 44] = [
    "what", "what's", "whats", "how", "how's", "hows", "when", "where", "why", "who", "will",
    "would", "is", "it", "it's", "be", "going", "to", "the", "a", "an", "there", "does", "do",
    "should", "i", "me", "like", "rain", "raining", "snow", "sunny", "hot", "cold", "warm",
    "tell", "show", "get", "give", "please", "about", "on", "this", "next",
];
/// Stop words that also occur inside place names: "Southend on Sea", "The Hague"
const NAME_JOINERS: [&str; 4] = ["on", "the", "a", "an"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Date,
    Preposition,
    Keyword,
    Stop,
    Word,
}

struct Token<'a> {
    raw: &'a str,
    key: String,
    kind: TokenKind,
}

/// Extracts a location and a date from free-form phrases
pub struct QueryInterpreter;

impl QueryInterpreter {
    /// Interpret a phrase such as "weather in Paris next friday"
    pub fn interpret(phrase: &str) -> Result<Interpretation> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(WeatherError::QueryEmpty);
        }

        if LocationParser::parse_coordinates(phrase).is_ok() {
            return Ok(Interpretation {
                location: Some(phrase.to_string()),
                date: DateExpression::Today,
                date_source: DateSource::Defaulted,
            });
        }

        let mut tokens: Vec<Token<'_>> = phrase
            .split_whitespace()
            .map(|word| {
                let raw = word.trim_end_matches(['?', '!', ';', ':']);
                let key = raw
                    .trim_end_matches([',', '.'])
                    .replace('\u{2019}', "'")
                    .to_lowercase();
                let kind = if PREPOSITIONS.contains(&key.as_str()) {
                    TokenKind::Preposition
                } else if KEYWORDS.contains(&key.as_str()) {
                    TokenKind::Keyword
                } else if STOPWORDS.contains(&key.as_str()) {
                    TokenKind::Stop
                } else {
                    TokenKind::Word
                };
                Token { raw, key, kind }
            })
            .filter(|token| !token.key.is_empty())
            .collect();

        let date = Self::find_date(&mut tokens);
        let location = Self::find_location(&tokens);

        let (date, date_source) = match date {
            Some(date) => (date, DateSource::Explicit),
            None => (DateExpression::Today, DateSource::Defaulted),
        };

        Ok(Interpretation {
            location,
            date,
            date_source,
        })
    }

    /// Find the first date expression and mark its tokens
    fn find_date(tokens: &mut [Token<'_>]) -> Option<DateExpression> {
        for idx in 0..tokens.len() {
            let key = tokens[idx].key.as_str();
            let next = tokens.get(idx + 1).map(|token| token.key.as_str());

            let found = match (key, next) {
                ("today" | "tonight", _) => Some((DateExpression::Today, 1)),
                ("tomorrow", _) => Some((DateExpression::Tomorrow, 1)),
                ("this", Some("weekend")) => Some((DateExpression::ThisWeekend, 2)),
                ("next", Some("weekend")) => Some((DateExpression::NextWeekend, 2)),
                ("this", Some("week")) => Some((DateExpression::ThisWeek, 2)),
                ("next", Some("week")) => Some((DateExpression::NextWeek, 2)),
                ("next", Some(day)) => {
                    parse_weekday(day, true).map(|day| (DateExpression::Next(day), 2))
                }
                ("this" | "on", Some(day)) => {
                    parse_weekday(day, true).map(|day| (DateExpression::On(day), 2))
                }
                ("weekend", _) => Some((DateExpression::ThisWeekend, 1)),
                (word, _) => parse_weekday(word, false)
                    .map(|day| (DateExpression::On(day), 1))
                    .or_else(|| {
                        NaiveDate::parse_from_str(word, "%Y-%m-%d")
                            .ok()
                            .map(|date| (DateExpression::Date(date), 1))
                    }),
            };

            if let Some((date, len)) = found {
                for token in &mut tokens[idx..idx + len] {
                    token.kind = TokenKind::Date;
                }
                return Some(date);
            }
        }
        None
    }

    fn find_location(tokens: &[Token<'_>]) -> Option<String> {
        // 1. "... in|for|at <location> ..."
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Preposition {
                if let Some((location, _)) = name_run(tokens, idx + 1) {
                    return Some(location);
                }
            }
        }

        // 2. "<location> weather ..."
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Keyword {
                if let Some((location, _)) = name_run(tokens, name_start(tokens, idx)) {
                    return Some(location);
                }
            }
        }

        // 3. "weather <location> ..."
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Keyword {
                if let Some((location, _)) = name_run(tokens, idx + 1) {
                    return Some(location);
                }
            }
        }

        // 4. "<location> [date words]" at the start
        let first = tokens
            .iter()
            .position(|token| token.kind != TokenKind::Stop)?;
        let start = if first > 0 && leads_name(&tokens[first - 1]) {
            first - 1
        } else {
            first
        };
        let (location, end) = name_run(tokens, start)?;
        let rest_is_filler = tokens[end..]
            .iter()
            .all(|token| matches!(token.kind, TokenKind::Date | TokenKind::Stop));
        rest_is_filler.then_some(location)
    }
}

fn joins_name(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Stop && NAME_JOINERS.contains(&token.key.as_str())
}

/// A capitalized article opening a name, as in "The Hague" or "A Coruna"
fn leads_name(token: &Token<'_>) -> bool {
    joins_name(token) && token.key != "on" && token.raw.starts_with(char::is_uppercase)
}

/// Place name starting at `start` and the index just past it.
///
/// Joiner stop words are kept between words, never at the end.
fn name_run(tokens: &[Token<'_>], start: usize) -> Option<(String, usize)> {
    let mut end = start;
    for (idx, token) in tokens.iter().enumerate().skip(start) {
        match token.kind {
            TokenKind::Word => end = idx + 1,
            _ if end > start && joins_name(token) => {}
            _ if idx == start && leads_name(token) => {}
            _ => break,
        }
    }
    if end == start {
        return None;
    }
    let words: Vec<&str> = tokens[start..end].iter().map(|token| token.raw).collect();
    Some((words.join(" ").trim_end_matches([',', '.']).to_string(), end))
}

/// Where a place name ending just before `end` starts; `end` when there is none
fn name_start(tokens: &[Token<'_>], end: usize) -> usize {
    let mut start = end;
    for idx in (0..end).rev() {
        let token = &tokens[idx];
        if token.kind == TokenKind::Word {
            start = idx;
        } else if start < end && leads_name(token) {
            start = idx;
            break;
        } else if !(start < end && joins_name(token)) {
            break;
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-10-19 is a Monday
    fn monday() -> NaiveDate {
        date(2026, 10, 19)
    }

    #[test]
    fn test_location_parser_coordinates() {
        assert_eq!(
            LocationParser::parse("51.5074,-0.1278").unwrap(),
            LocationInput::Coordinates(51.5074, -0.1278)
        );
        assert_eq!(
            LocationParser::parse("46.8182 8.2275").unwrap(),
            LocationInput::Coordinates(46.8182, 8.2275)
        );
        assert_eq!(
            LocationParser::parse("-46.8182, -8.2275").unwrap(),
            LocationInput::Coordinates(-46.8182, -8.2275)
        );
    }

    #[rstest]
    #[case("91.0,8.0")]
    #[case("-91.0,8.0")]
    #[case("46.0,181.0")]
    #[case("46.0")]
    #[case("46.0,8.0,0.0")]
    fn test_out_of_range_coordinates_are_names(#[case] input: &str) {
        assert!(matches!(
            LocationParser::parse(input).unwrap(),
            LocationInput::Name(_)
        ));
    }

    #[test]
    fn test_location_parser_empty() {
        assert!(matches!(
            LocationParser::parse("   "),
            Err(WeatherError::QueryEmpty)
        ));
    }

    #[rstest]
    #[case("12345")]
    #[case("CH-8001")]
    #[case("SW1A 1AA")]
    fn test_location_parser_postal_codes(#[case] input: &str) {
        assert!(matches!(
            LocationParser::parse(input).unwrap(),
            LocationInput::PostalCode(_)
        ));
    }

    #[rstest]
    #[case("Interlaken")]
    #[case("New York City")]
    #[case("Chamonix-Mont-Blanc")]
    fn test_location_parser_names(#[case] input: &str) {
        assert_eq!(
            LocationParser::parse(input).unwrap(),
            LocationInput::Name(input.to_string())
        );
    }

    #[rstest]
    #[case("London, UK", "London, United Kingdom")]
    #[case("Portland USA", "Portland United States")]
    #[case("Austin, U.S.", "Austin, United States")]
    #[case("Dubai, UAE", "Dubai, United Arab Emirates")]
    #[case("Paris", "Paris")]
    #[case("Ukiah", "Ukiah")]
    fn test_normalize_location_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_location_name(input), expected);
    }

    #[rstest]
    #[case(DateExpression::Today, (2026, 10, 19), (2026, 10, 19))]
    #[case(DateExpression::Tomorrow, (2026, 10, 20), (2026, 10, 20))]
    #[case(DateExpression::ThisWeekend, (2026, 10, 24), (2026, 10, 25))]
    #[case(DateExpression::NextWeekend, (2026, 10, 31), (2026, 11, 1))]
    #[case(DateExpression::ThisWeek, (2026, 10, 19), (2026, 10, 25))]
    #[case(DateExpression::NextWeek, (2026, 10, 26), (2026, 11, 1))]
    #[case(DateExpression::Next(Weekday::Mon), (2026, 10, 26), (2026, 10, 26))]
    #[case(DateExpression::Next(Weekday::Fri), (2026, 10, 23), (2026, 10, 23))]
    #[case(DateExpression::On(Weekday::Mon), (2026, 10, 19), (2026, 10, 19))]
    #[case(DateExpression::On(Weekday::Wed), (2026, 10, 21), (2026, 10, 21))]
    fn test_resolve_from_monday(
        #[case] expression: DateExpression,
        #[case] start: (i32, u32, u32),
        #[case] end: (i32, u32, u32),
    ) {
        let range = expression.resolve(monday());
        assert_eq!(range.start, date(start.0, start.1, start.2));
        assert_eq!(range.end, date(end.0, end.1, end.2));
    }

    #[test]
    fn test_weekend_resolution_on_the_weekend() {
        let saturday = date(2026, 10, 24);
        let sunday = date(2026, 10, 25);

        assert_eq!(
            DateExpression::ThisWeekend.resolve(saturday),
            DateRange::new(saturday, sunday)
        );
        assert_eq!(
            DateExpression::ThisWeekend.resolve(sunday),
            DateRange::single(sunday)
        );
        assert_eq!(
            DateExpression::NextWeekend.resolve(sunday),
            DateRange::new(date(2026, 10, 31), date(2026, 11, 1))
        );
    }

    #[rstest]
    #[case("What's the weather in Paris this weekend?", Some("Paris"), DateExpression::ThisWeekend)]
    #[case("weather in New York next friday", Some("New York"), DateExpression::Next(Weekday::Fri))]
    #[case("forecast for tomorrow in Berlin", Some("Berlin"), DateExpression::Tomorrow)]
    #[case("London weather tomorrow", Some("London"), DateExpression::Tomorrow)]
    #[case("weather Tokyo today", Some("Tokyo"), DateExpression::Today)]
    #[case("Madrid next week", Some("Madrid"), DateExpression::NextWeek)]
    #[case("how hot is it in Rome on Saturday", Some("Rome"), DateExpression::On(Weekday::Sat))]
    #[case("temperature at London, UK on 2026-10-21", Some("London, UK"), DateExpression::Date(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()))]
    #[case("weather at 51.5074,-0.1278 tomorrow", Some("51.5074,-0.1278"), DateExpression::Tomorrow)]
    #[case("will it rain tomorrow", None, DateExpression::Tomorrow)]
    #[case("weather in The Hague tomorrow", Some("The Hague"), DateExpression::Tomorrow)]
    #[case("forecast for A Coruna today", Some("A Coruna"), DateExpression::Today)]
    #[case("The Hague weather on sat", Some("The Hague"), DateExpression::On(Weekday::Sat))]
    #[case("is it cold in Paris on the weekend", Some("Paris"), DateExpression::ThisWeekend)]
    #[case("Southend on Sea next sun", Some("Southend on Sea"), DateExpression::Next(Weekday::Sun))]
    fn test_interpret(
        #[case] phrase: &str,
        #[case] location: Option<&str>,
        #[case] date: DateExpression,
    ) {
        let interpretation = QueryInterpreter::interpret(phrase).unwrap();
        assert_eq!(interpretation.location.as_deref(), location, "{phrase}");
        assert_eq!(interpretation.date, date, "{phrase}");
        assert_eq!(interpretation.date_source, DateSource::Explicit);
    }

    #[test]
    fn test_interpret_defaults_to_today() {
        let interpretation = QueryInterpreter::interpret("Paris sometime soon").unwrap();
        assert_eq!(interpretation.location.as_deref(), Some("Paris sometime soon"));
        assert_eq!(interpretation.date, DateExpression::Today);
        assert!(interpretation.date_defaulted());
        assert_eq!(
            interpretation.date_range(monday()),
            DateRange::single(monday())
        );
    }

    #[rstest]
    #[case("Southend on Sea weather", "Southend on Sea")]
    #[case("weather in Sun City", "Sun City")]
    #[case("what is the London weather", "London")]
    #[case("weather in Paris this afternoon", "Paris")]
    fn test_interpret_names_with_stop_words(#[case] phrase: &str, #[case] location: &str) {
        let interpretation = QueryInterpreter::interpret(phrase).unwrap();
        assert_eq!(interpretation.location.as_deref(), Some(location), "{phrase}");
        assert!(interpretation.date_defaulted(), "{phrase}");
    }

    #[test]
    fn test_interpret_bare_coordinates() {
        let interpretation = QueryInterpreter::interpret("51.5074,-0.1278").unwrap();
        assert_eq!(interpretation.location.as_deref(), Some("51.5074,-0.1278"));
        assert!(interpretation.date_defaulted());
    }

    #[test]
    fn test_interpret_empty() {
        assert!(matches!(
            QueryInterpreter::interpret(" "),
            Err(WeatherError::QueryEmpty)
        ));
    }

    #[rstest]
    #[case("today", DateExpression::Today)]
    #[case("this weekend", DateExpression::ThisWeekend)]
    #[case("next Friday", DateExpression::Next(Weekday::Fri))]
    #[case("Saturday", DateExpression::On(Weekday::Sat))]
    #[case("2026-10-21", DateExpression::Date(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()))]
    fn test_date_expression_round_trips_through_display(#[case] text: &str, #[case] expected: DateExpression) {
        assert_eq!(text.parse::<DateExpression>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<DateExpression>().unwrap(), expected);
    }

    #[rstest]
    #[case("someday")]
    #[case("Paris tomorrow")]
    #[case("")]
    fn test_date_expression_rejects_other_text(#[case] text: &str) {
        assert!(text.parse::<DateExpression>().is_err());
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(date(2026, 10, 25), date(2026, 10, 24));
        assert_eq!(range.start, date(2026, 10, 24));
        assert!(range.contains(date(2026, 10, 25)));
        assert!(!range.contains(date(2026, 10, 26)));
        assert_eq!(range.len_days(), 2);
    }
}
