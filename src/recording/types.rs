//! Recording types for ride samples.
//!
//! A [`SampleSeries`] is the immutable input to the analysis engine. It is
//! built by an ingestion collaborator (see [`crate::recording::importer_csv`])
//! and validated once on construction.

use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single recorded data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample timestamp
    pub timestamp: DateTime<Utc>,
    /// Speed in metres per second
    pub speed_mps: f64,
    /// Power in watts (absent on sensor dropout)
    pub power_watts: Option<f64>,
    /// Cadence in RPM
    pub cadence_rpm: Option<f64>,
}

impl Sample {
    /// Create a sample with speed only.
    pub fn new(timestamp: DateTime<Utc>, speed_mps: f64) -> Self {
        Self {
            timestamp,
            speed_mps,
            power_watts: None,
            cadence_rpm: None,
        }
    }

    /// Attach a power reading.
    pub fn with_power(mut self, power_watts: Option<f64>) -> Self {
        self.power_watts = power_watts;
        self
    }

    /// Attach a cadence reading.
    pub fn with_cadence(mut self, cadence_rpm: Option<f64>) -> Self {
        self.cadence_rpm = cadence_rpm;
        self
    }

    /// Speed in km/h.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_mps * 3.6
    }
}

/// Time-ordered, validated sequence of samples.
#[derive(Debug, Clone, Default)]
pub struct SampleSeries {
    samples: Vec<Sample>,
    /// Seconds since the first sample
    offsets: Vec<f64>,
    /// Time attributed to each sample
    durations: Vec<f64>,
}

impl SampleSeries {
    /// Build a series, rejecting unsorted timestamps and invalid speeds.
    ///
    /// Timestamps must be strictly increasing; a duplicate counts as unsorted.
    pub fn new(samples: Vec<Sample>) -> AnalyticsResult<Self> {
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AnalyticsError::UnsortedInput { index: index + 1 });
            }
        }

        if let Some(index) = samples
            .iter()
            .position(|s| !s.speed_mps.is_finite() || s.speed_mps < 0.0)
        {
            return Err(AnalyticsError::InvalidInput(format!(
                "speed at index {} must be finite and non-negative",
                index
            )));
        }

        let offsets = match samples.first() {
            Some(first) => samples
                .iter()
                .map(|s| seconds_between(first.timestamp, s.timestamp))
                .collect(),
            None => Vec::new(),
        };
        let durations = sample_durations(&offsets);

        Ok(Self {
            samples,
            offsets,
            durations,
        })
    }

    /// All samples in order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Seconds since the first sample, one per sample.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Time attributed to each sample.
    ///
    /// Sample `i` covers the interval since sample `i - 1`; the first sample is
    /// given the median interval of the series.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Speeds in metres per second.
    pub fn speeds(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.speed_mps).collect()
    }

    /// Raw power readings.
    pub fn powers(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.power_watts).collect()
    }

    /// Total time covered by the series, in seconds.
    pub fn total_duration_secs(&self) -> f64 {
        self.durations.iter().sum()
    }

    /// Whether any sample carries a power reading.
    pub fn has_power(&self) -> bool {
        self.samples.iter().any(|s| s.power_watts.is_some())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Seconds from `start` to `end`; zero if `end` precedes `start`.
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn sample_durations(offsets: &[f64]) -> Vec<f64> {
    if offsets.is_empty() {
        return Vec::new();
    }

    let mut intervals: Vec<f64> = offsets.windows(2).map(|w| w[1] - w[0]).collect();

    let mut sorted = intervals.clone();
    sorted.sort_by(f64::total_cmp);
    let first = match sorted.len() {
        0 => 1.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    };

    intervals.insert(0, first);
    intervals
}

/// Errors raised while importing ride files.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not well-formed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A required column is missing from the header.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// No usable samples in the input.
    #[error("No samples to import")]
    NoData,

    /// The samples do not form a valid series.
    #[error(transparent)]
    Series(#[from] AnalyticsError),
}
