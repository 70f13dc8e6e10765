//! Core library for the `trendcast` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and forecast providers (Open-Meteo)
//! - Trend analysis over the next 24 forecast hours
//! - The lookup pipeline tying them together
//!
//! It is used by `trendcast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod trend;

pub use config::{Config, Endpoints};
pub use error::LookupError;
pub use lookup::WeatherLookup;
pub use model::{
    CurrentConditions, Forecast, HourlySample, Place, RainLikelihood, TemperatureDirection,
    TemperatureUnit, TrendVerdict, Units, WeatherReport, WindSpeedUnit,
};
pub use provider::{ForecastSource, Geocoder};
pub use trend::TrendThresholds;
