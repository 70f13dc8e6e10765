use anyhow::{Context, Result, anyhow, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::{
    model::{TemperatureUnit, WindSpeedUnit},
    trend::TrendThresholds,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Base URLs of the two read-only services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub forecast: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            forecast: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// language = "en"
/// temperature_unit = "celsius"
///
/// [thresholds]
/// temperature_delta = 1.0
/// rain_probability = 50
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred language for geocoding results.
    pub language: String,
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    /// Ceiling for each HTTP request, in seconds.
    pub timeout_secs: u64,
    pub endpoints: Endpoints,
    pub thresholds: TrendThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            temperature_unit: TemperatureUnit::default(),
            wind_speed_unit: WindSpeedUnit::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            endpoints: Endpoints::default(),
            thresholds: TrendThresholds::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values that would make every lookup fail or hang.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.language.trim().is_empty(), "language must not be empty");
        ensure!(self.timeout_secs > 0, "timeout_secs must be greater than zero");
        ensure!(
            !self.endpoints.geocoding.trim().is_empty(),
            "endpoints.geocoding must not be empty"
        );
        ensure!(
            !self.endpoints.forecast.trim().is_empty(),
            "endpoints.forecast must not be empty"
        );
        ensure!(
            self.thresholds.temperature_delta.is_finite()
                && self.thresholds.temperature_delta >= 0.0,
            "thresholds.temperature_delta must be a non-negative number"
        );
        ensure!(
            self.thresholds.rain_probability <= 100,
            "thresholds.rain_probability must be a percentage (0-100)"
        );

        Ok(())
    }

    /// Load config from the platform config directory, or return defaults if
    /// it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "trendcast", "trendcast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
