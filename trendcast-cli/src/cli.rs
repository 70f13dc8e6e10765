use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use trendcast_core::{Config, LookupError, TemperatureUnit, WeatherLookup, WindSpeedUnit};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "trendcast",
    version,
    about = "Current weather, 24-hour forecast and trend for any city"
)]
pub struct Cli {
    /// Read settings from this file instead of the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather, forecast chart and trend for a location.
    Show {
        /// City name, optionally with region/country, e.g. "Paris, France".
        location: String,

        /// Also print the hourly table for the next 12 hours.
        #[arg(long)]
        details: bool,

        /// Print the report as JSON.
        #[arg(long, conflicts_with = "details")]
        json: bool,
    },

    /// Search repeatedly from a prompt until Esc or Ctrl-C.
    Interactive {
        /// Also print the hourly table for the next 12 hours.
        #[arg(long)]
        details: bool,
    },

    /// Interactively edit settings and save them.
    Configure,

    /// Print the path of the config file in use.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let Cli { config: config_path, command, .. } = self;
        let config_path = config_path.as_deref();

        match command {
            Command::Show { location, details, json } => {
                let config = load_config(config_path)?;
                show(&config, &location, details, json).await
            }
            Command::Interactive { details } => {
                let config = load_config(config_path)?;
                interactive(&config, details).await
            }
            Command::Configure => configure(config_path),
            Command::ConfigPath => {
                let path = match config_path {
                    Some(path) => path.to_path_buf(),
                    None => Config::config_file_path()?,
                };
                println!("{}", path.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn show(config: &Config, location: &str, details: bool, json: bool) -> Result<ExitCode> {
    let lookup = WeatherLookup::from_config(config)?;

    match lookup.lookup(location).await {
        Ok(report) if json => {
            let body =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        Ok(report) => {
            println!("{}", render::report(&report, details));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_failure(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn interactive(config: &Config, details: bool) -> Result<ExitCode> {
    let lookup = WeatherLookup::from_config(config)?;

    println!("Weather Predictor: current weather and 24-hour forecast with trend prediction");

    loop {
        let input = Text::new("Enter city name:")
            .with_placeholder("e.g., London, New York, Tokyo")
            .with_help_message(
                "Add country/state for better results: 'Portland, Oregon' or 'Paris, France'. Esc to quit.",
            )
            .prompt();

        let query = match input {
            Ok(query) => query,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read location"),
        };

        match lookup.lookup(&query).await {
            Ok(report) => println!("{}\n", render::report(&report, details)),
            Err(err) => report_failure(&err),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_failure(err: &LookupError) {
    tracing::warn!(error = %err, "lookup failed");
    eprintln!("{}", render::lookup_error(err));
}

fn configure(path: Option<&Path>) -> Result<ExitCode> {
    let mut config = load_config(path)?;

    let language = Text::new("Preferred language for place names:")
        .with_default(&config.language)
        .prompt()?;
    config.language = language.trim().to_string();

    let units = TemperatureUnit::all();
    let cursor = units.iter().position(|u| *u == config.temperature_unit).unwrap_or(0);
    config.temperature_unit = Select::new("Temperature unit:", units.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    let units = WindSpeedUnit::all();
    let cursor = units.iter().position(|u| *u == config.wind_speed_unit).unwrap_or(0);
    config.wind_speed_unit = Select::new("Wind speed unit:", units.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;

    let saved = match path {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved.display());
    Ok(ExitCode::SUCCESS)
}
