//! Power metrics: Normalized Power, Intensity Factor and ride totals.
//!
//! NP = 4th root of the mean of (rolling mean power)^4, with the rolling mean
//! taken over `np_window_secs` ending at each sample. It is defined over the
//! whole ride and does not depend on segmentation.

use crate::metrics::cleaning::{clean_power, CleaningOptions, PowerTrack};
use crate::metrics::error::AnalyticsResult;
use crate::metrics::smoothing::rolling_statistics;
use crate::recording::types::SampleSeries;
use crate::storage::config::PowerSettings;
use serde::Serialize;

/// Power-specific metrics for a ride.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PowerMetrics {
    /// Normalized Power (0 when the ride has no usable power)
    pub normalized_power: f64,
    /// Intensity Factor (NP / FTP)
    pub intensity_factor: Option<f64>,
    /// Time-weighted average power
    pub average_power: Option<f64>,
    /// Maximum power after artifact removal
    pub max_power: Option<f64>,
    /// NP / average power
    pub variability_index: Option<f64>,
    /// Training Stress Score
    pub training_stress_score: Option<f64>,
    /// Mechanical work in kilojoules
    pub work_kj: Option<f64>,
    /// Samples carrying power after cleaning
    pub valid_samples: usize,
    /// Readings removed as artifacts
    pub rejected_samples: usize,
    /// Samples filled by interpolation
    pub interpolated_samples: usize,
}

/// Calculates power metrics for a ride.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    settings: PowerSettings,
}

impl MetricsCalculator {
    pub fn new(settings: PowerSettings) -> Self {
        Self { settings }
    }

    /// Filter artifacts and apply the interpolation policy.
    pub fn clean(&self, series: &SampleSeries) -> PowerTrack {
        clean_power(
            series.offsets(),
            &series.powers(),
            CleaningOptions {
                max_power: self.settings.power_max_threshold,
                interpolate: self.settings.power_interpolate,
                max_gap_secs: self.settings.max_interpolation_gap_secs,
            },
        )
    }

    /// Compute power metrics from an already cleaned track.
    pub fn calculate(&self, series: &SampleSeries, track: &PowerTrack) -> AnalyticsResult<PowerMetrics> {
        self.settings.validate()?;

        let np = normalized_power(series.offsets(), &track.values, self.settings.np_window_secs)?;
        let valid_samples = track.valid_count();

        let mut metrics = PowerMetrics {
            normalized_power: np,
            valid_samples,
            rejected_samples: track.rejected,
            interpolated_samples: track.interpolated,
            ..Default::default()
        };

        if valid_samples == 0 {
            tracing::debug!("No usable power, reporting NP as 0");
            return Ok(metrics);
        }

        let durations = series.durations();
        let mut weighted = 0.0;
        let mut powered_secs = 0.0;
        for (p, dt) in track.values.iter().zip(durations) {
            if let Some(p) = p {
                weighted += p * dt;
                powered_secs += dt;
            }
        }

        let average = if powered_secs > 0.0 {
            weighted / powered_secs
        } else {
            0.0
        };

        metrics.average_power = Some(average);
        metrics.max_power = track.present().reduce(f64::max);
        metrics.work_kj = Some(weighted / 1000.0);
        metrics.variability_index = (average > 0.0).then(|| np / average);
        metrics.intensity_factor = intensity_factor(np, self.settings.ftp);
        metrics.training_stress_score = metrics
            .intensity_factor
            .map(|if_value| training_stress_score(series.total_duration_secs(), if_value));

        Ok(metrics)
    }
}

/// Normalized Power of a power track.
///
/// Windows containing no present value are skipped. Returns 0 when no value
/// is present at all.
pub fn normalized_power(offsets: &[f64], power: &[Option<f64>], window_secs: f64) -> AnalyticsResult<f64> {
    let windows = rolling_statistics(offsets, power, window_secs)?;

    let mut sum_fourth_power = 0.0;
    let mut count = 0usize;
    for mean in windows.iter().filter_map(|w| w.mean) {
        sum_fourth_power += mean.powi(4);
        count += 1;
    }

    if count == 0 {
        return Ok(0.0);
    }

    let avg_fourth_power = sum_fourth_power / count as f64;
    Ok(avg_fourth_power.powf(0.25))
}

/// Intensity Factor, present only for a positive FTP and a ride with power.
pub fn intensity_factor(normalized_power: f64, ftp: Option<f64>) -> Option<f64> {
    match ftp {
        Some(ftp) if ftp > 0.0 => Some(normalized_power / ftp),
        _ => None,
    }
}

/// Training Stress Score for a ride of `duration_secs` at `intensity_factor`.
pub fn training_stress_score(duration_secs: f64, intensity_factor: f64) -> f64 {
    let duration_hours = duration_secs / 3600.0;
    duration_hours * intensity_factor * intensity_factor * 100.0
}
