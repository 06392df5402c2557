//! Cruising speed summary and per-phase time breakdown.

use crate::metrics::segmentation::{Phase, Segmentation};
use crate::recording::types::SampleSeries;
use serde::Serialize;

/// Headline cruising figures for a ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CruisingSummary {
    /// Time-weighted cruising speed (m/s)
    pub cruising_speed_mps: f64,
    /// Time-weighted cruising speed (km/h)
    pub cruising_speed_kmh: f64,
    /// Unweighted mean of cruising sample speeds (m/s)
    pub mean_speed_mps: f64,
    pub cruising_samples: usize,
    pub total_samples: usize,
    pub cruising_time_secs: f64,
    /// Cruising share of total ride time
    pub cruising_fraction: f64,
    /// Time-weighted cruising power
    pub average_power: Option<f64>,
    /// Time-weighted cruising cadence
    pub average_cadence: Option<f64>,
}

impl CruisingSummary {
    /// Summarize the cruising samples of a segmented ride.
    ///
    /// `power` is the cleaned power track. Returns `None` when nothing was
    /// classified as cruising.
    pub fn from_ride(
        series: &SampleSeries,
        segmentation: &Segmentation,
        power: &[Option<f64>],
    ) -> Option<Self> {
        let samples = series.samples();
        let durations = series.durations();

        let mut time = 0.0;
        let mut speed_time = 0.0;
        let mut speed_sum = 0.0;
        let mut count = 0usize;
        let mut power_acc = WeightedMean::default();
        let mut cadence_acc = WeightedMean::default();

        for i in segmentation.indices_of(Phase::Cruising) {
            let dt = durations[i];
            time += dt;
            speed_time += samples[i].speed_mps * dt;
            speed_sum += samples[i].speed_mps;
            count += 1;
            power_acc.add(power.get(i).copied().flatten(), dt);
            cadence_acc.add(samples[i].cadence_rpm, dt);
        }

        if count == 0 || time <= 0.0 {
            return None;
        }

        let total = series.total_duration_secs();
        let cruising_speed_mps = speed_time / time;

        Some(Self {
            cruising_speed_mps,
            cruising_speed_kmh: cruising_speed_mps * 3.6,
            mean_speed_mps: speed_sum / count as f64,
            cruising_samples: count,
            total_samples: series.len(),
            cruising_time_secs: time,
            cruising_fraction: if total > 0.0 { time / total } else { 0.0 },
            average_power: power_acc.mean(),
            average_cadence: cadence_acc.mean(),
        })
    }
}

#[derive(Debug, Default)]
struct WeightedMean {
    sum: f64,
    weight: f64,
}

impl WeightedMean {
    fn add(&mut self, value: Option<f64>, weight: f64) {
        if let Some(v) = value {
            self.sum += v * weight;
            self.weight += weight;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.weight > 0.0).then(|| self.sum / self.weight)
    }
}

/// Total time per phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PhaseBreakdown {
    pub stopped_secs: f64,
    pub transition_secs: f64,
    pub cruising_secs: f64,
    /// Confirmed stops
    pub stop_count: usize,
    pub cruising_run_count: usize,
}

impl PhaseBreakdown {
    pub fn from_segmentation(segmentation: &Segmentation) -> Self {
        let mut breakdown = Self::default();
        for run in segmentation.runs() {
            match run.phase {
                Phase::Stopped => {
                    breakdown.stopped_secs += run.duration_secs;
                    breakdown.stop_count += 1;
                }
                Phase::Transition => breakdown.transition_secs += run.duration_secs,
                Phase::Cruising => {
                    breakdown.cruising_secs += run.duration_secs;
                    breakdown.cruising_run_count += 1;
                }
            }
        }
        breakdown
    }

    pub fn total_secs(&self) -> f64 {
        self.stopped_secs + self.transition_secs + self.cruising_secs
    }
}
