//! Plain-text rendering of a weather report.

use trendcast_core::{
    HourlySample, LookupError, RainLikelihood, TrendVerdict, Units, WeatherReport,
};

const CHART_ROWS: usize = 8;
const CHART_LABEL_EVERY: usize = 6;
const DETAIL_HOURS: usize = 12;
const NOT_AVAILABLE: &str = "N/A";
const FOOTER: &str = "Data provided by Open-Meteo.com • No API key required";

pub fn report(report: &WeatherReport, details: bool) -> String {
    let place = &report.place;
    let mut sections = vec![
        format!(
            "Found: {} ({:.2}, {:.2})",
            place.display_name, place.latitude, place.longitude
        ),
        current_conditions(report),
        format!(
            "{}-Hour Temperature Forecast\n{}",
            report.window.len(),
            chart(&report.window, &report.units.temperature)
        ),
        trend_sentence(&report.verdict, &report.units.temperature),
    ];

    if details {
        sections.push(format!(
            "Detailed Hourly Forecast\n{}",
            hourly_table(&report.window, &report.units)
        ));
    }

    sections.push(FOOTER.to_string());
    sections.join("\n\n")
}

/// Message shown in place of a report when a lookup fails.
pub fn lookup_error(err: &LookupError) -> String {
    format!("Error: {}", err.user_message())
}

fn current_conditions(report: &WeatherReport) -> String {
    let units = &report.units;
    let current = report.current.as_ref();

    let temperature = current.and_then(|c| c.temperature);
    let apparent = current.and_then(|c| c.apparent_temperature);
    let wind = current.and_then(|c| c.wind_speed);

    [
        "Current Weather".to_string(),
        format!("  Temperature: {}", measurement(temperature, &units.temperature)),
        format!("  Feels like:  {}", measurement(apparent, &units.temperature)),
        format!("  Wind speed:  {}", measurement(wind, &units.wind_speed)),
    ]
    .join("\n")
}

fn measurement(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.1} {unit}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Vertical bar chart, one column per hour, hour-of-day labels underneath.
pub fn chart(samples: &[HourlySample], unit: &str) -> String {
    if samples.is_empty() {
        return "No forecast data available".to_string();
    }

    let min = samples.iter().map(|s| s.temperature).fold(f64::INFINITY, f64::min);
    let max = samples.iter().map(|s| s.temperature).fold(f64::NEG_INFINITY, f64::max);
    let heights: Vec<usize> = samples.iter().map(|s| bar_height(s.temperature, min, max)).collect();

    let mut lines = Vec::with_capacity(CHART_ROWS + 2);

    for row in (1..=CHART_ROWS).rev() {
        let label = match row {
            CHART_ROWS => format!("{max:.1}{unit}"),
            1 => format!("{min:.1}{unit}"),
            _ => String::new(),
        };
        let bars: String =
            heights.iter().map(|&h| if h >= row { "█ " } else { "  " }).collect();
        lines.push(format!("{label:>9} │{}", bars.trim_end()));
    }

    lines.push(format!("{:>9} └{}", "", "─".repeat(samples.len() * 2)));

    let mut axis = vec![' '; samples.len() * 2];
    for (i, sample) in samples.iter().enumerate().step_by(CHART_LABEL_EVERY) {
        let hour = sample.time.format("%H").to_string();
        for (offset, c) in hour.chars().enumerate() {
            if let Some(slot) = axis.get_mut(i * 2 + offset) {
                *slot = c;
            }
        }
    }
    let axis: String = axis.into_iter().collect();
    lines.push(format!("{:>9}  {}", "", axis.trim_end()));

    lines.join("\n")
}

/// Row count (1..=CHART_ROWS) for a temperature within [min, max].
fn bar_height(temperature: f64, min: f64, max: f64) -> usize {
    if max - min < f64::EPSILON {
        return CHART_ROWS / 2;
    }

    let scaled = (temperature - min) / (max - min) * (CHART_ROWS - 1) as f64;
    1 + scaled.round() as usize
}

pub fn trend_sentence(verdict: &TrendVerdict, unit: &str) -> String {
    let first_hours = verdict.hours / 2;
    let last_hours = verdict.hours - first_hours;

    let rain = match verdict.rain {
        RainLikelihood::Likely => format!(
            "Rain is likely in the next {} hours (up to {}%).",
            verdict.hours, verdict.max_precipitation_probability
        ),
        RainLikelihood::Unlikely => {
            format!("Low chance of rain in the next {} hours.", verdict.hours)
        }
    };

    format!(
        "Trend: temperatures will be {} ({:.1}{unit} over the next {first_hours} h → \
         {:.1}{unit} over the following {last_hours} h). {rain}",
        verdict.direction.description(),
        verdict.first_half_mean,
        verdict.second_half_mean,
    )
}

pub fn hourly_table(samples: &[HourlySample], units: &Units) -> String {
    samples
        .iter()
        .take(DETAIL_HOURS)
        .map(|s| {
            let precip = s
                .precipitation_probability
                .map(|p| format!("{p}%"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let wind = s
                .wind_speed
                .map(|w| format!("{w:.1} {}", units.wind_speed))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            format!(
                "{} | Temp: {:.1}{} | Precip: {precip} | Wind: {wind}",
                s.time.format("%Y-%m-%d %H:%M"),
                s.temperature,
                units.temperature,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
