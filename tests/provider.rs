//! WeatherAPI.com client against a mock server

mod common;

use serde_json::json;
use weatherdash::config::WeatherConfig;
use weatherdash::{WeatherApiClient, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> WeatherApiClient {
    WeatherApiClient::new(&WeatherConfig {
        api_key: Some(common::API_KEY.to_string()),
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn search_returns_candidates_in_provider_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("key", common::API_KEY))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::search_results()))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = client(&server).search("London").await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].country.as_deref(), Some("United Kingdom"));
    assert_eq!(candidates[1].region.as_deref(), Some("Ontario"));
    assert_eq!(candidates[1].provider_id, Some(315_398));
}

#[tokio::test]
async fn forecast_parses_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "42.98,-81.25"))
        .and(query_param("days", "2"))
        .and(query_param("aqi", "no"))
        .and(query_param("alerts", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ontario_forecast()))
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server).forecast(42.98, -81.25, 2).await.unwrap();
    assert_eq!(report.location.name, "London");
    assert_eq!(report.current.temperature_c, 20.0);
    assert_eq!(report.current.condition.icon_url().as_deref(), Some("https://cdn.weatherapi.com/weather/64x64/day/113.png"));
    assert_eq!(report.forecast.len(), 2);
    assert_eq!(report.forecast[1].chance_of_rain, 85);
    assert_eq!(report.forecast[0].sunrise.as_deref(), Some("07:25 AM"));
}

#[tokio::test]
async fn forecast_days_are_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::ontario_forecast()))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).forecast(42.98, -81.25, 14).await.unwrap();
}

#[tokio::test]
async fn rate_limit_is_reported_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let result = client(&server).forecast(51.52, -0.11, 1).await;
    assert!(matches!(
        result,
        Err(WeatherError::ProviderRateLimited { retry_after: Some(30) })
    ));
}

#[tokio::test]
async fn no_matching_location_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&server)
        .await;

    let result = client(&server).forecast(0.0, 0.0, 1).await;
    assert!(matches!(result, Err(WeatherError::LocationNotFound { .. })));
}

#[tokio::test]
async fn rejected_key_and_server_errors_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 2006, "message": "API key is invalid." }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(matches!(
        client.search("London").await,
        Err(WeatherError::ProviderUnavailable { message }) if message.contains("rejected")
    ));
    assert!(matches!(
        client.forecast(51.52, -0.11, 1).await,
        Err(WeatherError::ProviderUnavailable { message }) if message.contains("500")
    ));
}

#[tokio::test]
async fn malformed_body_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).search("London").await,
        Err(WeatherError::ProviderUnavailable { .. })
    ));
}
