//! Trend inference over the next hours of a forecast.
//!
//! The window starts at the current local hour and spans up to
//! [`WINDOW_HOURS`] samples. Temperature direction compares the mean of the
//! first half of the window against the mean of the second half; rain
//! likelihood looks at the highest precipitation probability in the window.
//! Both comparisons are strict: a value equal to its threshold never flips
//! the label.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    error::LookupError,
    model::{HourlySample, RainLikelihood, TemperatureDirection, TrendVerdict},
};

pub const WINDOW_HOURS: usize = 24;
pub const MIN_SAMPLES: usize = 2;
pub const TEMPERATURE_DELTA_THRESHOLD: f64 = 1.0;
pub const RAIN_PROBABILITY_THRESHOLD: u8 = 50;

/// Cutoffs used to classify the forecast window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Degrees (in the configured unit) the half means must differ by.
    pub temperature_delta: f64,
    /// Percentage the peak precipitation probability must exceed.
    pub rain_probability: u8,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            temperature_delta: TEMPERATURE_DELTA_THRESHOLD,
            rain_probability: RAIN_PROBABILITY_THRESHOLD,
        }
    }
}

/// Index of the sample whose timestamp equals `hour`, or 0 when none does.
pub fn current_hour_index(samples: &[HourlySample], hour: NaiveDateTime) -> usize {
    samples.iter().position(|s| s.time == hour).unwrap_or(0)
}

/// The samples for the next [`WINDOW_HOURS`] hours starting at `hour`.
pub fn next_hours(samples: &[HourlySample], hour: NaiveDateTime) -> &[HourlySample] {
    let start = current_hour_index(samples, hour);
    let end = samples.len().min(start + WINDOW_HOURS);
    &samples[start..end]
}

pub fn classify_temperature(
    first_half_mean: f64,
    second_half_mean: f64,
    threshold: f64,
) -> TemperatureDirection {
    let delta = second_half_mean - first_half_mean;

    if delta > threshold {
        TemperatureDirection::Warming
    } else if -delta > threshold {
        TemperatureDirection::Cooling
    } else {
        TemperatureDirection::Stable
    }
}

pub fn classify_rain(max_probability: u8, threshold: u8) -> RainLikelihood {
    if max_probability > threshold {
        RainLikelihood::Likely
    } else {
        RainLikelihood::Unlikely
    }
}

/// Classify a window of samples. Pure: the same window always yields the
/// same verdict.
pub fn analyze(
    window: &[HourlySample],
    thresholds: &TrendThresholds,
) -> Result<TrendVerdict, LookupError> {
    if window.len() < MIN_SAMPLES {
        return Err(LookupError::InsufficientData {
            available: window.len(),
            required: MIN_SAMPLES,
        });
    }

    let (first, second) = window.split_at(window.len() / 2);
    let first_half_mean = mean_temperature(first);
    let second_half_mean = mean_temperature(second);

    // Hours without a probability do not count toward the peak.
    let max_precipitation_probability = window
        .iter()
        .filter_map(|s| s.precipitation_probability)
        .max()
        .unwrap_or(0);

    Ok(TrendVerdict {
        direction: classify_temperature(
            first_half_mean,
            second_half_mean,
            thresholds.temperature_delta,
        ),
        rain: classify_rain(max_precipitation_probability, thresholds.rain_probability),
        first_half_mean,
        second_half_mean,
        max_precipitation_probability,
        hours: window.len(),
    })
}

fn mean_temperature(samples: &[HourlySample]) -> f64 {
    let sum: f64 = samples.iter().map(|s| s.temperature).sum();
    sum / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid start time")
    }

    fn samples(temps: &[f64], precip: &[u8]) -> Vec<HourlySample> {
        temps
            .iter()
            .zip(precip)
            .enumerate()
            .map(|(i, (&temperature, &p))| HourlySample {
                time: start() + Duration::hours(i as i64),
                temperature,
                apparent_temperature: Some(temperature - 1.0),
                precipitation_probability: Some(p),
                wind_speed: Some(10.0),
            })
            .collect()
    }

    fn flat(temperature: f64, n: usize) -> Vec<f64> {
        vec![temperature; n]
    }

    #[test]
    fn twelve_tens_then_twelve_fifteens_is_warming() {
        let mut temps = flat(10.0, 12);
        temps.extend(flat(15.0, 12));
        let window = samples(&temps, &[0; 24]);

        let verdict = analyze(&window, &TrendThresholds::default()).expect("verdict");

        assert_eq!(verdict.direction, TemperatureDirection::Warming);
        assert_eq!(verdict.first_half_mean, 10.0);
        assert_eq!(verdict.second_half_mean, 15.0);
        assert_eq!(verdict.hours, 24);
    }

    #[test]
    fn falling_temperatures_are_cooling() {
        let mut temps = flat(20.0, 12);
        temps.extend(flat(12.5, 12));
        let window = samples(&temps, &[0; 24]);

        let verdict = analyze(&window, &TrendThresholds::default()).expect("verdict");
        assert_eq!(verdict.direction, TemperatureDirection::Cooling);
    }

    #[test]
    fn difference_equal_to_threshold_is_stable() {
        let mut temps = flat(10.0, 12);
        temps.extend(flat(11.0, 12));
        let window = samples(&temps, &[0; 24]);
        let thresholds = TrendThresholds::default();

        let up = analyze(&window, &thresholds).expect("verdict");
        assert_eq!(up.direction, TemperatureDirection::Stable);

        temps.reverse();
        let down = analyze(&samples(&temps, &[0; 24]), &thresholds).expect("verdict");
        assert_eq!(down.direction, TemperatureDirection::Stable);
    }

    #[test]
    fn difference_just_above_threshold_is_warming() {
        assert_eq!(classify_temperature(10.0, 11.25, 1.0), TemperatureDirection::Warming);
        assert_eq!(classify_temperature(11.25, 10.0, 1.0), TemperatureDirection::Cooling);
        assert_eq!(classify_temperature(10.0, 11.0, 1.0), TemperatureDirection::Stable);
    }

    #[test]
    fn rain_threshold_is_strictly_greater() {
        assert_eq!(classify_rain(50, 50), RainLikelihood::Unlikely);
        assert_eq!(classify_rain(51, 50), RainLikelihood::Likely);
    }

    #[test]
    fn peak_of_fifty_is_unlikely_and_fifty_one_is_likely() {
        let temps = flat(10.0, 24);
        let mut precip = [20u8; 24];
        precip[7] = 50;
        let thresholds = TrendThresholds::default();

        let verdict = analyze(&samples(&temps, &precip), &thresholds).expect("verdict");
        assert_eq!(verdict.rain, RainLikelihood::Unlikely);
        assert_eq!(verdict.max_precipitation_probability, 50);

        precip[7] = 51;
        let verdict = analyze(&samples(&temps, &precip), &thresholds).expect("verdict");
        assert_eq!(verdict.rain, RainLikelihood::Likely);
    }

    #[test]
    fn one_wet_hour_makes_rain_likely() {
        let temps = flat(10.0, 24);
        let mut precip = [0u8, 10, 20, 30, 40, 45].repeat(4);
        let thresholds = TrendThresholds::default();

        let dry = analyze(&samples(&temps, &precip), &thresholds).expect("verdict");
        assert_eq!(dry.rain, RainLikelihood::Unlikely);

        precip[15] = 80;
        let wet = analyze(&samples(&temps, &precip), &thresholds).expect("verdict");
        assert_eq!(wet.rain, RainLikelihood::Likely);
    }

    #[test]
    fn missing_probabilities_are_ignored() {
        let mut window = samples(&flat(10.0, 4), &[0, 0, 0, 0]);
        for s in &mut window {
            s.precipitation_probability = None;
        }

        let verdict = analyze(&window, &TrendThresholds::default()).expect("verdict");
        assert_eq!(verdict.max_precipitation_probability, 0);
        assert_eq!(verdict.rain, RainLikelihood::Unlikely);
    }

    #[test]
    fn single_sample_is_insufficient() {
        let window = samples(&[10.0], &[0]);
        let err = analyze(&window, &TrendThresholds::default()).unwrap_err();

        assert!(matches!(
            err,
            LookupError::InsufficientData { available: 1, required: 2 }
        ));
    }

    #[test]
    fn empty_window_is_insufficient() {
        let err = analyze(&[], &TrendThresholds::default()).unwrap_err();
        assert!(matches!(err, LookupError::InsufficientData { available: 0, .. }));
    }

    #[test]
    fn two_samples_produce_a_verdict() {
        let window = samples(&[10.0, 13.0], &[10, 60]);
        let verdict = analyze(&window, &TrendThresholds::default()).expect("verdict");

        assert_eq!(verdict.direction, TemperatureDirection::Warming);
        assert_eq!(verdict.rain, RainLikelihood::Likely);
        assert_eq!(verdict.hours, 2);
    }

    #[test]
    fn odd_window_puts_extra_sample_in_second_half() {
        let window = samples(&[10.0, 20.0, 20.0], &[0, 0, 0]);
        let verdict = analyze(&window, &TrendThresholds::default()).expect("verdict");

        assert_eq!(verdict.first_half_mean, 10.0);
        assert_eq!(verdict.second_half_mean, 20.0);
    }

    #[test]
    fn analysis_is_deterministic() {
        let temps: Vec<f64> = (0..24).map(|i| 8.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let precip: Vec<u8> = (0..24).map(|i| (i * 3) as u8).collect();
        let window = samples(&temps, &precip);
        let thresholds = TrendThresholds::default();

        let a = analyze(&window, &thresholds).expect("verdict");
        let b = analyze(&window, &thresholds).expect("verdict");
        assert_eq!(a, b);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let mut temps = flat(10.0, 12);
        temps.extend(flat(12.0, 12));
        let window = samples(&temps, &[60; 24]);
        let thresholds = TrendThresholds { temperature_delta: 3.0, rain_probability: 70 };

        let verdict = analyze(&window, &thresholds).expect("verdict");
        assert_eq!(verdict.direction, TemperatureDirection::Stable);
        assert_eq!(verdict.rain, RainLikelihood::Unlikely);
    }

    #[test]
    fn window_starts_at_matching_hour() {
        let all = samples(&flat(10.0, 48), &[0; 48]);
        let hour = start() + Duration::hours(5);

        assert_eq!(current_hour_index(&all, hour), 5);
        let window = next_hours(&all, hour);
        assert_eq!(window.len(), WINDOW_HOURS);
        assert_eq!(window[0].time, hour);
    }

    #[test]
    fn window_falls_back_to_first_sample_without_match() {
        let all = samples(&flat(10.0, 48), &[0; 48]);
        let unmatched = start() - Duration::days(3);

        assert_eq!(current_hour_index(&all, unmatched), 0);
        assert_eq!(next_hours(&all, unmatched)[0].time, start());
    }

    #[test]
    fn window_is_truncated_near_end_of_forecast() {
        let all = samples(&flat(10.0, 48), &[0; 48]);
        let late = start() + Duration::hours(40);

        assert_eq!(next_hours(&all, late).len(), 8);

        let last = start() + Duration::hours(47);
        let window = next_hours(&all, last);
        assert_eq!(window.len(), 1);
        assert!(analyze(window, &TrendThresholds::default()).is_err());
    }
}
