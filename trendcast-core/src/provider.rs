use crate::{
    Config,
    error::LookupError,
    model::{Forecast, Place},
    provider::{forecast::OpenMeteoForecast, geocoding::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod forecast;
pub mod geocoding;

const USER_AGENT: &str = concat!("trendcast/", env!("CARGO_PKG_VERSION"));

/// Resolves a free-text location to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn resolve(&self, query: &str) -> Result<Place, LookupError>;
}

/// Fetches hourly forecast data for a coordinate.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, LookupError>;
}

/// Construct the geocoder described by `config`.
pub fn geocoder_from_config(config: &Config) -> Result<Box<dyn Geocoder>, LookupError> {
    let geocoder = OpenMeteoGeocoder::new(
        config.endpoints.geocoding.clone(),
        config.language.clone(),
        config.timeout(),
    )?;

    Ok(Box::new(geocoder))
}

/// Construct the forecast source described by `config`.
pub fn forecast_source_from_config(
    config: &Config,
) -> Result<Box<dyn ForecastSource>, LookupError> {
    let source = OpenMeteoForecast::new(
        config.endpoints.forecast.clone(),
        config.temperature_unit,
        config.wind_speed_unit,
        config.timeout(),
    )?;

    Ok(Box::new(source))
}

/// HTTP client with a bounded per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, LookupError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LookupError::Network(format!("Failed to build HTTP client: {e}")))
}

/// Issue a GET and return the body of a successful response.
///
/// Transport failures, timeouts and non-2xx statuses all map to
/// [`LookupError::Network`].
pub(crate) async fn get_body(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
    service: &str,
) -> Result<String, LookupError> {
    tracing::debug!(url, service, "sending request");

    let res = http.get(url).query(query).send().await.map_err(|e| {
        let kind = if e.is_timeout() { "timed out" } else { "failed" };
        LookupError::Network(format!("Request to {service} {kind}: {e}"))
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| {
        LookupError::Network(format!("Failed to read {service} response body: {e}"))
    })?;

    if !status.is_success() {
        tracing::warn!(%status, service, "request rejected");
        return Err(LookupError::Network(format!(
            "{service} request failed with status {status}: {}",
            truncate_body(&body),
        )));
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
