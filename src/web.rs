//! Web dashboard and JSON API

mod pages;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::WebConfig;
use crate::location_resolver::Resolution;
use crate::query::{DateExpression, DateRange};
use crate::service::{Lookup, WeatherRequest, WeatherService, forecast_window};
use crate::units::UnitSystem;
use crate::WeatherError;

pub use pages::{Flash, View};

type SharedService = Arc<WeatherService>;

pub fn router(service: SharedService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/weather/{lat}/{lon}", get(weather))
        .route("/forecast/{lat}/{lon}", get(forecast))
        .route("/favorite/{id}", post(toggle_favorite))
        .route("/api/weather/{lat}/{lon}", get(api_weather))
        .route("/api/search", get(api_search))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(cors),
        )
        .with_state(service)
}

/// Serve until Ctrl-C
pub async fn serve(service: SharedService, config: &WebConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let app = router(service);

    if let (Some(cert), Some(key)) = (&config.tls_cert, &config.tls_key) {
        return serve_tls(app, addr, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server failed")
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: SocketAddr, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("failed to load TLS certificate `{cert}` and key `{key}`"))?;
    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_app: Router, _addr: SocketAddr, _cert: &str, _key: &str) -> Result<()> {
    anyhow::bail!("TLS is configured but weatherdash was built without the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", error);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// HTTP status for each error kind
fn status_code(error: &WeatherError) -> StatusCode {
    match error {
        WeatherError::QueryEmpty | WeatherError::Validation { .. } => StatusCode::BAD_REQUEST,
        WeatherError::LocationNotFound { .. } => StatusCode::NOT_FOUND,
        WeatherError::LocationAmbiguous { .. } => StatusCode::CONFLICT,
        WeatherError::ProviderRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        WeatherError::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
        WeatherError::Persistence { .. } | WeatherError::Config { .. } | WeatherError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_kind(error: &WeatherError) -> &'static str {
    match error {
        WeatherError::QueryEmpty => "query_empty",
        WeatherError::LocationNotFound { .. } => "location_not_found",
        WeatherError::LocationAmbiguous { .. } => "location_ambiguous",
        WeatherError::ProviderUnavailable { .. } => "provider_unavailable",
        WeatherError::ProviderRateLimited { .. } => "provider_rate_limited",
        WeatherError::Persistence { .. } => "persistence",
        WeatherError::Config { .. } => "config",
        WeatherError::Validation { .. } => "validation",
        WeatherError::Io { .. } => "io",
    }
}

/// JSON error body for the `/api` routes
struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(error: WeatherError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);
        if status.is_server_error() {
            warn!("API request failed: {}", self.0);
        }
        let mut body = json!({
            "error": error_kind(&self.0),
            "message": self.0.user_message(),
        });
        match &self.0 {
            WeatherError::LocationAmbiguous { candidates, .. } => {
                body["candidates"] = json!(candidates);
            }
            WeatherError::ProviderRateLimited {
                retry_after: Some(seconds),
            } => {
                body["retry_after"] = json!(seconds);
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

/// Failed page requests re-render the home page with the message flashed
struct PageError {
    error: WeatherError,
    service: SharedService,
    query: String,
}

impl PageError {
    async fn render(self) -> Response {
        let status = status_code(&self.error);
        let flash = Flash::from(&self.error);
        match home(&self.service, Some(flash), &self.query).await {
            Ok(page) => (status, page).into_response(),
            Err(error) => {
                warn!("Failed to render the home page: {}", error);
                (status, pages::error_page(&Flash::from(&error))).into_response()
            }
        }
    }
}

async fn home(service: &WeatherService, flash: Option<Flash>, query: &str) -> crate::Result<maud::Markup> {
    let favorites = service.favorites().await?;
    let recent = service.saved_locations(10).await?;
    let settings = service.settings().await?;
    Ok(pages::index(&favorites, &recent, settings.temperature_unit, flash.as_ref(), query))
}

async fn index(State(service): State<SharedService>) -> Response {
    match home(&service, None, "").await {
        Ok(page) => page.into_response(),
        Err(error) => (status_code(&error), pages::error_page(&Flash::from(&error))).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    q: String,
    /// `name` (default) or `ask`
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

async fn search(State(service): State<SharedService>, Form(form): Form<SearchForm>) -> Response {
    let query = form.q.trim().to_string();
    let page_error = |error: WeatherError, service: SharedService| PageError {
        error,
        service,
        query: query.clone(),
    };

    let unit = match parse_unit(form.unit.as_deref()) {
        Ok(unit) => unit,
        Err(error) => return page_error(error, service).render().await,
    };

    if form.mode.as_deref() == Some("ask") {
        let request = WeatherRequest {
            unit,
            ..WeatherRequest::default()
        };
        return match service.ask(&query, &request).await {
            Ok(Lookup::Weather(result)) => pages::weather(&result, View::Forecast).into_response(),
            Ok(Lookup::Disambiguate {
                query: location,
                candidates,
                interpretation,
            }) => {
                let links = LinkParams {
                    unit,
                    dates: interpretation.map(|interpretation| interpretation.date),
                };
                pages::candidates(&location, &candidates, &links.suffix()).into_response()
            }
            Err(error) => page_error(error, service).render().await,
        };
    }

    match service.resolve(&query).await {
        Ok(Resolution::Selected(candidate)) => {
            let links = LinkParams { unit, dates: None };
            Redirect::to(&format!(
                "/weather/{}/{}{}",
                candidate.latitude,
                candidate.longitude,
                links.suffix()
            ))
            .into_response()
        }
        Ok(Resolution::Ambiguous(candidates)) => {
            let links = LinkParams { unit, dates: None };
            pages::candidates(&query, &candidates, &links.suffix()).into_response()
        }
        Err(error) => page_error(error, service).render().await,
    }
}

/// Query string carried over to candidate links
struct LinkParams {
    unit: Option<UnitSystem>,
    dates: Option<DateExpression>,
}

impl LinkParams {
    fn suffix(&self) -> String {
        let mut params = Vec::new();
        if let Some(unit) = self.unit {
            params.push(format!("unit={}", unit.letter()));
        }
        if let Some(dates) = self.dates {
            params.push(format!(
                "display=forecast&when={}",
                urlencoding::encode(&dates.to_string())
            ));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WeatherParams {
    unit: Option<String>,
    display: Option<String>,
    days: Option<u8>,
    /// Relative date phrase such as `next friday`
    when: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl WeatherParams {
    fn request(&self) -> crate::Result<WeatherRequest> {
        let today = Local::now().date_naive();
        let when = self.when.as_deref().filter(|when| !when.trim().is_empty());
        let (range, dates) = match (when, self.from, self.to) {
            (Some(when), None, None) => {
                let dates: DateExpression = when.parse()?;
                (Some(forecast_window(dates.resolve(today), today)?), Some(dates))
            }
            (Some(_), _, _) => {
                return Err(WeatherError::validation("`when` cannot be combined with `from` or `to`"));
            }
            (None, Some(from), to) => (
                Some(forecast_window(DateRange::new(from, to.unwrap_or(from)), today)?),
                None,
            ),
            (None, None, Some(_)) => {
                return Err(WeatherError::validation("`to` needs a `from` date"));
            }
            (None, None, None) => (None, None),
        };
        Ok(WeatherRequest {
            unit: parse_unit(self.unit.as_deref())?,
            days: self.days,
            range,
            dates,
            select: None,
        })
    }

    fn view(&self, default: View) -> crate::Result<View> {
        match self.display.as_deref() {
            None | Some("") => Ok(default),
            Some("current") => Ok(View::Current),
            Some("forecast") => Ok(View::Forecast),
            Some(other) => Err(WeatherError::validation(format!(
                "Unknown display '{other}'. Use current or forecast"
            ))),
        }
    }
}

fn parse_unit(unit: Option<&str>) -> crate::Result<Option<UnitSystem>> {
    unit.filter(|unit| !unit.is_empty())
        .map(str::parse)
        .transpose()
}

async fn weather(
    State(service): State<SharedService>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(params): Query<WeatherParams>,
) -> Response {
    weather_page(service, lat, lon, params, View::Current).await
}

async fn forecast(
    State(service): State<SharedService>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(params): Query<WeatherParams>,
) -> Response {
    weather_page(service, lat, lon, params, View::Forecast).await
}

async fn weather_page(service: SharedService, lat: f64, lon: f64, params: WeatherParams, default: View) -> Response {
    let outcome = async {
        let view = params.view(default)?;
        let result = service
            .weather_for_coordinates(lat, lon, &params.request()?)
            .await?;
        Ok::<_, WeatherError>(pages::weather(&result, view))
    }
    .await;

    match outcome {
        Ok(page) => page.into_response(),
        Err(error) => {
            PageError {
                error,
                service,
                query: String::new(),
            }
            .render()
            .await
        }
    }
}

#[derive(Debug, Deserialize)]
struct FavoriteForm {
    /// Local path to return to
    next: Option<String>,
}

async fn toggle_favorite(
    State(service): State<SharedService>,
    Path(id): Path<i64>,
    Form(form): Form<FavoriteForm>,
) -> Response {
    match service.toggle_favorite(id).await {
        Ok(_) => {
            let next = form
                .next
                .filter(|next| next.starts_with('/') && !next.starts_with("//"))
                .unwrap_or_else(|| "/".to_string());
            Redirect::to(&next).into_response()
        }
        Err(error) => {
            PageError {
                error,
                service,
                query: String::new(),
            }
            .render()
            .await
        }
    }
}

async fn api_weather(
    State(service): State<SharedService>,
    Path((lat, lon)): Path<(f64, f64)>,
    Query(params): Query<WeatherParams>,
) -> Result<Response, ApiError> {
    let result = service
        .weather_for_coordinates(lat, lon, &params.request()?)
        .await?;
    Ok(Json(result).into_response())
}

#[derive(Debug, Deserialize)]
struct ApiSearchParams {
    #[serde(default)]
    q: String,
}

async fn api_search(
    State(service): State<SharedService>,
    Query(params): Query<ApiSearchParams>,
) -> Result<Response, ApiError> {
    let candidates = service.search(&params.q).await?;
    Ok(Json(candidates).into_response())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}
