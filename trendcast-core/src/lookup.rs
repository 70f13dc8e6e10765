//! The geocode → forecast → trend pipeline behind a single search.

use chrono::{DateTime, Utc};

use crate::{
    Config,
    error::LookupError,
    model::WeatherReport,
    provider::{ForecastSource, Geocoder, forecast_source_from_config, geocoder_from_config},
    trend::{self, TrendThresholds},
};

#[derive(Debug)]
pub struct WeatherLookup {
    geocoder: Box<dyn Geocoder>,
    forecast: Box<dyn ForecastSource>,
    thresholds: TrendThresholds,
}

impl WeatherLookup {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        forecast: Box<dyn ForecastSource>,
        thresholds: TrendThresholds,
    ) -> Self {
        Self { geocoder, forecast, thresholds }
    }

    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        Ok(Self::new(
            geocoder_from_config(config)?,
            forecast_source_from_config(config)?,
            config.thresholds,
        ))
    }

    pub async fn lookup(&self, query: &str) -> Result<WeatherReport, LookupError> {
        self.lookup_at(query, Utc::now()).await
    }

    /// Run one search. The forecast is only requested once geocoding succeeds.
    pub async fn lookup_at(
        &self,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherReport, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let place = self.geocoder.resolve(query).await?;
        let forecast = self.forecast.fetch(place.latitude, place.longitude).await?;

        let hour = forecast.reference_hour(now);
        let window = trend::next_hours(&forecast.hourly, hour).to_vec();
        let verdict = trend::analyze(&window, &self.thresholds)?;

        tracing::info!(
            place = %place.display_name,
            direction = ?verdict.direction,
            rain = ?verdict.rain,
            hours = verdict.hours,
            "trend computed"
        );

        Ok(WeatherReport {
            place,
            units: forecast.units,
            current: forecast.current,
            window,
            verdict,
        })
    }
}
