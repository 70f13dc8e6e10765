use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::LookupError,
    model::{
        CurrentConditions, Forecast, HourlySample, TemperatureUnit, Units, WindSpeedUnit,
    },
};

use super::{ForecastSource, get_body, http_client};

const HOURLY_FIELDS: &str =
    "temperature_2m,apparent_temperature,precipitation_probability,wind_speed_10m";
const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,wind_speed_10m";
const FORECAST_DAYS: &str = "2";

/// Open-Meteo hourly forecast. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    base_url: String,
    temperature_unit: TemperatureUnit,
    wind_speed_unit: WindSpeedUnit,
}

impl OpenMeteoForecast {
    pub fn new(
        base_url: impl Into<String>,
        temperature_unit: TemperatureUnit,
        wind_speed_unit: WindSpeedUnit,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.into(),
            temperature_unit,
            wind_speed_unit,
        })
    }

    fn requested_units(&self) -> Units {
        Units::new(self.temperature_unit, self.wind_speed_unit)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(default)]
    hourly: Option<RawHourly>,
    #[serde(default)]
    hourly_units: Option<RawHourlyUnits>,
    #[serde(default)]
    current: Option<RawCurrent>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Option<Vec<String>>,
    temperature_2m: Option<Vec<f64>>,
    apparent_temperature: Option<Vec<Option<f64>>>,
    precipitation_probability: Option<Vec<Option<u8>>>,
    wind_speed_10m: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct RawHourlyUnits {
    temperature_2m: Option<String>,
    wind_speed_10m: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: String,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    wind_speed_10m: Option<f64>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, LookupError> {
    field.ok_or_else(|| {
        LookupError::MalformedResponse(format!("forecast response is missing hourly.{name}"))
    })
}

/// Open-Meteo emits local times as `YYYY-MM-DDTHH:MM`.
fn parse_local_time(raw: &str) -> Result<NaiveDateTime, LookupError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| LookupError::MalformedResponse(format!("invalid timestamp '{raw}': {e}")))
}

/// Turn a raw forecast body into index-aligned hourly samples.
fn parse_forecast(body: &str, requested: Units) -> Result<Forecast, LookupError> {
    let parsed: ForecastResponse = serde_json::from_str(body).map_err(|e| {
        LookupError::MalformedResponse(format!("Failed to parse forecast JSON: {e}"))
    })?;

    let hourly = parsed.hourly.ok_or_else(|| {
        LookupError::MalformedResponse("forecast response has no hourly block".to_string())
    })?;

    let time = required(hourly.time, "time")?;
    let temperature = required(hourly.temperature_2m, "temperature_2m")?;
    let apparent = required(hourly.apparent_temperature, "apparent_temperature")?;
    let precipitation = required(hourly.precipitation_probability, "precipitation_probability")?;
    let wind = required(hourly.wind_speed_10m, "wind_speed_10m")?;

    let len = time.len();
    if [temperature.len(), apparent.len(), precipitation.len(), wind.len()]
        .iter()
        .any(|&n| n != len)
    {
        return Err(LookupError::MalformedResponse(format!(
            "hourly arrays differ in length (time: {len}, temperature_2m: {}, \
             apparent_temperature: {}, precipitation_probability: {}, wind_speed_10m: {})",
            temperature.len(),
            apparent.len(),
            precipitation.len(),
            wind.len(),
        )));
    }

    let hourly = time
        .iter()
        .zip(temperature)
        .zip(apparent)
        .zip(precipitation)
        .zip(wind)
        .map(|((((raw_time, temperature), apparent), precipitation), wind)| -> Result<_, LookupError> {
            Ok(HourlySample {
                time: parse_local_time(raw_time)?,
                temperature,
                apparent_temperature: apparent,
                precipitation_probability: precipitation.map(|p| p.min(100)),
                wind_speed: wind,
            })
        })
        .collect::<Result<Vec<_>, LookupError>>()?;

    let current = parsed
        .current
        .map(|c| {
            Ok::<_, LookupError>(CurrentConditions {
                time: parse_local_time(&c.time)?,
                temperature: c.temperature_2m,
                apparent_temperature: c.apparent_temperature,
                wind_speed: c.wind_speed_10m,
            })
        })
        .transpose()?;

    let units = match parsed.hourly_units {
        Some(reported) => Units {
            temperature: reported.temperature_2m.unwrap_or(requested.temperature),
            wind_speed: reported.wind_speed_10m.unwrap_or(requested.wind_speed),
        },
        None => requested,
    };

    Ok(Forecast {
        utc_offset_seconds: parsed.utc_offset_seconds,
        units,
        current,
        hourly,
    })
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, LookupError> {
        let body = get_body(
            &self.http,
            &self.base_url,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
                ("timezone", "auto".to_string()),
                ("temperature_unit", self.temperature_unit.as_query_value().to_string()),
                ("wind_speed_unit", self.wind_speed_unit.as_query_value().to_string()),
            ],
            "forecast service",
        )
        .await?;

        let forecast = parse_forecast(&body, self.requested_units())?;
        tracing::debug!(hours = forecast.hourly.len(), "forecast received");

        Ok(forecast)
    }
}
