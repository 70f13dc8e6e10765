use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit requested from the forecast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub const fn all() -> &'static [TemperatureUnit] {
        &[TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit]
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// Wind speed unit requested from the forecast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Ms,
    Mph,
    Kn,
}

impl WindSpeedUnit {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "kmh",
            WindSpeedUnit::Ms => "ms",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Kn => "kn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindSpeedUnit::Kmh => "km/h",
            WindSpeedUnit::Ms => "m/s",
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Kn => "kn",
        }
    }

    pub const fn all() -> &'static [WindSpeedUnit] {
        &[WindSpeedUnit::Kmh, WindSpeedUnit::Ms, WindSpeedUnit::Mph, WindSpeedUnit::Kn]
    }
}

impl std::fmt::Display for WindSpeedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Unit labels as reported by the forecast service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub temperature: String,
    pub wind_speed: String,
}

impl Units {
    pub fn new(temperature: TemperatureUnit, wind_speed: WindSpeedUnit) -> Self {
        Self {
            temperature: temperature.symbol().to_string(),
            wind_speed: wind_speed.label().to_string(),
        }
    }
}

/// One forecast hour. `time` is local to the forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub apparent_temperature: Option<f64>,
    pub precipitation_probability: Option<u8>,
    pub wind_speed: Option<f64>,
}

/// Conditions at the time of the request, local to the forecast location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub utc_offset_seconds: i32,
    pub units: Units,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<HourlySample>,
}

impl Forecast {
    /// The current hour at the forecast location.
    ///
    /// Prefers the service-reported current time; falls back to `now` shifted
    /// by the location's UTC offset.
    pub fn reference_hour(&self, now: DateTime<Utc>) -> NaiveDateTime {
        let local = match &self.current {
            Some(current) => current.time,
            None => now.naive_utc() + Duration::seconds(i64::from(self.utc_offset_seconds)),
        };

        truncate_to_hour(local)
    }
}

fn truncate_to_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date().and_hms_opt(time.hour(), 0, 0).unwrap_or(time)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureDirection {
    Warming,
    Cooling,
    Stable,
}

impl TemperatureDirection {
    pub fn description(&self) -> &'static str {
        match self {
            TemperatureDirection::Warming => "warming up",
            TemperatureDirection::Cooling => "cooling down",
            TemperatureDirection::Stable => "staying stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainLikelihood {
    Likely,
    Unlikely,
}

/// Outcome of trend analysis over the next hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendVerdict {
    pub direction: TemperatureDirection,
    pub rain: RainLikelihood,
    pub first_half_mean: f64,
    pub second_half_mean: f64,
    pub max_precipitation_probability: u8,
    pub hours: usize,
}

/// Everything a single lookup produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub place: Place,
    pub units: Units,
    pub current: Option<CurrentConditions>,
    pub window: Vec<HourlySample>,
    pub verdict: TrendVerdict,
}
