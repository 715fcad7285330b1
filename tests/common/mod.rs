//! Canned WeatherAPI.com responses shared by the integration tests

#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key-1234";

pub fn search_results() -> Value {
    json!([
        {
            "id": 2801268,
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "url": "london-city-of-london-greater-london-united-kingdom"
        },
        {
            "id": 315398,
            "name": "London",
            "region": "Ontario",
            "country": "Canada",
            "lat": 42.98,
            "lon": -81.25,
            "url": "london-ontario-canada"
        }
    ])
}

pub fn forecast(name: &str, region: &str, country: &str, lat: f64, lon: f64) -> Value {
    json!({
        "location": {
            "name": name,
            "region": region,
            "country": country,
            "lat": lat,
            "lon": lon,
            "tz_id": "Europe/London",
            "localtime": "2026-10-19 12:00"
        },
        "current": {
            "last_updated": "2026-10-19 11:45",
            "temp_c": 20.0,
            "feelslike_c": 19.0,
            "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png", "code": 1000 },
            "wind_kph": 10.0,
            "wind_degree": 90,
            "wind_dir": "E",
            "pressure_mb": 1020.0,
            "precip_mm": 0.0,
            "humidity": 55,
            "cloud": 0,
            "uv": 4.0,
            "gust_kph": 14.0,
            "vis_km": 10.0
        },
        "forecast": {
            "forecastday": [
                {
                    "date": "2026-10-19",
                    "day": {
                        "maxtemp_c": 21.0,
                        "mintemp_c": 11.0,
                        "avgtemp_c": 16.0,
                        "maxwind_kph": 18.0,
                        "totalprecip_mm": 0.0,
                        "avghumidity": 60,
                        "daily_chance_of_rain": 0,
                        "daily_chance_of_snow": 0,
                        "condition": { "text": "Sunny", "icon": "", "code": 1000 },
                        "uv": 4.0
                    },
                    "astro": { "sunrise": "07:25 AM", "sunset": "06:01 PM" }
                },
                {
                    "date": "2026-10-20",
                    "day": {
                        "maxtemp_c": 17.0,
                        "mintemp_c": 9.0,
                        "avgtemp_c": 13.0,
                        "maxwind_kph": 25.0,
                        "totalprecip_mm": 4.2,
                        "avghumidity": 80,
                        "daily_chance_of_rain": 85,
                        "daily_chance_of_snow": 0,
                        "condition": { "text": "Patchy rain nearby", "icon": "", "code": 1063 },
                        "uv": 2.0
                    },
                    "astro": { "sunrise": "07:27 AM", "sunset": "05:59 PM" }
                }
            ]
        }
    })
}

pub fn ontario_forecast() -> Value {
    forecast("London", "Ontario", "Canada", 42.98, -81.25)
}

/// Provider mock answering `London` with two candidates and forecasts for any coordinates
pub async fn london_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_results()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "42.98,-81.25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ontario_forecast()))
        .mount(&server)
        .await;
    server
}
