use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{error::LookupError, model::Place};

use super::{Geocoder, get_body, http_client};

/// Open-Meteo geocoding search. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    base_url: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.into(),
            language: language.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl GeoResult {
    /// `name[, admin1][, country]`, skipping blank parts.
    fn display_name(&self) -> String {
        std::iter::once(Some(self.name.as_str()))
            .chain([self.admin1.as_deref(), self.country.as_deref()])
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn into_place(self) -> Result<Place, LookupError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(LookupError::MalformedResponse(format!(
                "geocoding result '{}' has out-of-range coordinates ({}, {})",
                self.name, self.latitude, self.longitude
            )));
        }

        Ok(Place {
            display_name: self.display_name(),
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// Turn a raw geocoding body into the first matching place.
fn parse_search(query: &str, body: &str) -> Result<Place, LookupError> {
    let parsed: GeoSearchResponse = serde_json::from_str(body).map_err(|e| {
        LookupError::MalformedResponse(format!("Failed to parse geocoding JSON: {e}"))
    })?;

    parsed
        .results
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| LookupError::LocationNotFound(query.to_string()))?
        .into_place()
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn resolve(&self, query: &str) -> Result<Place, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let body = get_body(
            &self.http,
            &self.base_url,
            &[
                ("name", query.to_string()),
                ("count", "1".to_string()),
                ("language", self.language.clone()),
                ("format", "json".to_string()),
            ],
            "geocoding service",
        )
        .await?;

        let place = parse_search(query, &body)?;
        tracing::info!(
            query,
            place = %place.display_name,
            latitude = place.latitude,
            longitude = place.longitude,
            "resolved location"
        );

        Ok(place)
    }
}
