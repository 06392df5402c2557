//! Riding phase segmentation.
//!
//! Every sample is classified as [`Phase::Stopped`], [`Phase::Transition`] or
//! [`Phase::Cruising`] in two linear passes:
//!
//! 1. a pure per-sample rule using speed, local acceleration and the rolling
//!    speed standard deviation;
//! 2. a debounce pass that demotes stopped runs shorter than the minimum stop
//!    duration to transitions.
//!
//! The rolling stability test absorbs noise at speed; the debounce absorbs
//! noise at rest.

use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::smoothing::rolling_statistics;
use crate::recording::types::SampleSeries;
use crate::storage::config::SegmentationSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Riding phase of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Confirmed stop
    Stopped,
    /// Accelerating, decelerating or riding below cruising speed.
    /// Also the state before any evidence.
    #[default]
    Transition,
    /// Stable riding at or above cruising speed
    Cruising,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Stopped => write!(f, "Stopped"),
            Phase::Transition => write!(f, "Transition"),
            Phase::Cruising => write!(f, "Cruising"),
        }
    }
}

/// A maximal run of consecutive samples sharing one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseRun {
    pub phase: Phase,
    /// First sample index
    pub start_index: usize,
    /// Last sample index (inclusive)
    pub end_index: usize,
    /// Seconds from ride start to the first sample
    pub start_offset_secs: f64,
    /// Sum of the run's sample durations
    pub duration_secs: f64,
}

impl PhaseRun {
    /// Number of samples in the run.
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Segmentation of a ride.
#[derive(Debug, Clone, Serialize)]
pub struct Segmentation {
    /// One label per sample
    labels: Vec<Phase>,
    /// Contiguous label runs covering the series
    runs: Vec<PhaseRun>,
    /// Local acceleration per sample (m/s²)
    acceleration: Vec<f64>,
    /// Rolling speed standard deviation per sample
    speed_std_dev: Vec<f64>,
}

impl Segmentation {
    pub fn labels(&self) -> &[Phase] {
        &self.labels
    }

    pub fn runs(&self) -> &[PhaseRun] {
        &self.runs
    }

    pub fn acceleration(&self) -> &[f64] {
        &self.acceleration
    }

    pub fn speed_std_dev(&self) -> &[f64] {
        &self.speed_std_dev
    }

    /// Indices of samples labelled `phase`.
    pub fn indices_of(&self, phase: Phase) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == phase)
            .map(|(i, _)| i)
    }

    /// Runs labelled `phase`.
    pub fn runs_of(&self, phase: Phase) -> impl Iterator<Item = &PhaseRun> + '_ {
        self.runs.iter().filter(move |r| r.phase == phase)
    }
}

/// Classifies samples into riding phases.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSegmenter {
    settings: SegmentationSettings,
}

impl PhaseSegmenter {
    pub fn new(settings: SegmentationSettings) -> Self {
        Self { settings }
    }

    /// Segment a series.
    ///
    /// Fails with `InsufficientData` for fewer than two samples and with
    /// `InvalidConfiguration` if the settings are inconsistent.
    pub fn segment(&self, series: &SampleSeries) -> AnalyticsResult<Segmentation> {
        self.settings.validate()?;

        if series.len() < 2 {
            return Err(AnalyticsError::InsufficientData(format!(
                "segmentation needs at least 2 samples, got {}",
                series.len()
            )));
        }

        let offsets = series.offsets();
        let speeds = series.speeds();

        let present: Vec<Option<f64>> = speeds.iter().copied().map(Some).collect();
        let speed_std_dev: Vec<f64> =
            rolling_statistics(offsets, &present, self.settings.rolling_window_secs)?
                .iter()
                .map(|s| s.std_dev.unwrap_or_default())
                .collect();
        let acceleration = local_acceleration(offsets, &speeds);

        let mut labels: Vec<Phase> = speeds
            .iter()
            .zip(&acceleration)
            .zip(&speed_std_dev)
            .map(|((&v, &a), &sd)| self.classify(v, a, sd))
            .collect();

        let demoted = debounce_stops(&mut labels, series.durations(), self.settings.stop_duration_min_secs);
        let runs = collect_runs(&labels, offsets, series.durations());

        tracing::debug!(
            "Segmented {} samples into {} runs ({} short stops demoted)",
            labels.len(),
            runs.len(),
            demoted
        );

        Ok(Segmentation {
            labels,
            runs,
            acceleration,
            speed_std_dev,
        })
    }

    /// Candidate phase for one sample, before debouncing.
    pub fn classify(&self, speed: f64, acceleration: f64, speed_std_dev: f64) -> Phase {
        let s = &self.settings;
        if speed < s.stop_speed_threshold {
            Phase::Stopped
        } else if speed >= s.min_cruising_speed
            && acceleration.abs() <= s.acceleration_threshold
            && speed_std_dev <= s.max_speed_std_dev()
        {
            Phase::Cruising
        } else {
            Phase::Transition
        }
    }
}

/// Local speed derivative.
///
/// Central difference over the two neighbours for interior samples and
/// one-sided differences at the ends. A zero time step yields zero.
pub fn local_acceleration(offsets: &[f64], speeds: &[f64]) -> Vec<f64> {
    let n = speeds.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let slope = |a: usize, b: usize| {
        let dt = offsets[b] - offsets[a];
        if dt > 0.0 {
            (speeds[b] - speeds[a]) / dt
        } else {
            0.0
        }
    };

    (0..n)
        .map(|i| match i {
            0 => slope(0, 1),
            i if i == n - 1 => slope(n - 2, n - 1),
            i => slope(i - 1, i + 1),
        })
        .collect()
}

/// Demote stopped runs shorter than `min_duration_secs` to transitions.
///
/// Returns the number of runs demoted.
fn debounce_stops(labels: &mut [Phase], durations: &[f64], min_duration_secs: f64) -> usize {
    let mut demoted = 0;
    let mut i = 0;
    while i < labels.len() {
        if labels[i] != Phase::Stopped {
            i += 1;
            continue;
        }

        let start = i;
        let mut duration = 0.0;
        while i < labels.len() && labels[i] == Phase::Stopped {
            duration += durations[i];
            i += 1;
        }

        if duration < min_duration_secs {
            labels[start..i].fill(Phase::Transition);
            demoted += 1;
        }
    }
    demoted
}

fn collect_runs(labels: &[Phase], offsets: &[f64], durations: &[f64]) -> Vec<PhaseRun> {
    let mut runs: Vec<PhaseRun> = Vec::new();
    for (i, &phase) in labels.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.phase == phase => {
                run.end_index = i;
                run.duration_secs += durations[i];
            }
            _ => runs.push(PhaseRun {
                phase,
                start_index: i,
                end_index: i,
                start_offset_secs: offsets[i],
                duration_secs: durations[i],
            }),
        }
    }
    runs
}
