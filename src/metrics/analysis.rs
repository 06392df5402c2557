//! Full ride analysis.
//!
//! Segmentation failures are terminal. Everything downstream of it is a
//! partial result: when a metric cannot be computed it is reported as absent
//! and the rest of the analysis still goes through, so a ride with a broken
//! power meter still gets its full speed analysis.

use crate::metrics::calculator::{MetricsCalculator, PowerMetrics};
use crate::metrics::cruising::{CruisingSummary, PhaseBreakdown};
use crate::metrics::distribution::Distribution;
use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::segmentation::{Phase, PhaseRun, PhaseSegmenter, Segmentation};
use crate::metrics::zones::{PowerZones, ZoneTime};
use crate::recording::types::SampleSeries;
use crate::storage::config::AnalysisConfig;
use serde::Serialize;

/// Derived metrics of a ride.
#[derive(Debug, Clone, Serialize)]
pub struct RideMetrics {
    /// Power metrics; absent only if they could not be computed
    pub power: Option<PowerMetrics>,
    pub speed_distribution: Option<Distribution>,
    pub cruising_speed_distribution: Option<Distribution>,
    pub power_distribution: Option<Distribution>,
    pub cruising_power_distribution: Option<Distribution>,
    /// Time in Coggan zones, when FTP and power are available
    pub time_in_zones: Option<Vec<ZoneTime>>,
}

impl RideMetrics {
    pub fn normalized_power(&self) -> Option<f64> {
        self.power.map(|p| p.normalized_power)
    }

    pub fn intensity_factor(&self) -> Option<f64> {
        self.power.and_then(|p| p.intensity_factor)
    }
}

/// Everything the presentation layer needs about one ride.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub segmentation: Segmentation,
    pub phase_breakdown: PhaseBreakdown,
    pub cruising: Option<CruisingSummary>,
    pub metrics: RideMetrics,
    pub duration_secs: f64,
}

impl AnalysisResult {
    pub fn labels(&self) -> &[Phase] {
        self.segmentation.labels()
    }

    pub fn runs(&self) -> &[PhaseRun] {
        self.segmentation.runs()
    }
}

/// Runs segmentation and metrics for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct RideAnalyzer {
    config: AnalysisConfig,
}

impl RideAnalyzer {
    /// Create an analyzer, validating the configuration.
    pub fn new(config: AnalysisConfig) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a ride.
    pub fn analyze(&self, series: &SampleSeries) -> AnalyticsResult<AnalysisResult> {
        let segmentation = PhaseSegmenter::new(self.config.segmentation).segment(series)?;

        let calculator = MetricsCalculator::new(self.config.power);
        let track = calculator.clean(series);
        let power = partial("power metrics", calculator.calculate(series, &track));

        let bins = self.config.distribution.histogram_bins;
        let speeds = series.speeds();

        let speed_distribution = partial(
            "speed distribution",
            Distribution::from_values(speeds.iter().copied(), bins),
        );
        let cruising_speed_distribution = partial(
            "cruising speed distribution",
            Distribution::from_values(segmentation.indices_of(Phase::Cruising).map(|i| speeds[i]), bins),
        );
        let power_distribution = partial(
            "power distribution",
            Distribution::from_values(track.present(), bins),
        );
        let cruising_power_distribution = partial(
            "cruising power distribution",
            Distribution::from_values(
                segmentation
                    .indices_of(Phase::Cruising)
                    .filter_map(|i| track.values[i]),
                bins,
            ),
        );

        let time_in_zones = match self.config.power.effective_ftp() {
            Some(ftp) if track.valid_count() > 0 => {
                Some(PowerZones::from_ftp(ftp).time_in_zones(&track.values, series.durations()))
            }
            _ => None,
        };

        let cruising = CruisingSummary::from_ride(series, &segmentation, &track.values);
        if cruising.is_none() {
            tracing::warn!("No cruising segments identified with current thresholds");
        }

        let phase_breakdown = PhaseBreakdown::from_segmentation(&segmentation);

        tracing::info!(
            "Analyzed {} samples: {:.0}s cruising, NP {:.0} W",
            series.len(),
            phase_breakdown.cruising_secs,
            power.map_or(0.0, |p| p.normalized_power)
        );

        Ok(AnalysisResult {
            segmentation,
            phase_breakdown,
            cruising,
            metrics: RideMetrics {
                power,
                speed_distribution,
                cruising_speed_distribution,
                power_distribution,
                cruising_power_distribution,
                time_in_zones,
            },
            duration_secs: series.total_duration_secs(),
        })
    }
}

/// Downgrade a failed partial computation to an absent value.
fn partial<T>(what: &str, result: Result<T, AnalyticsError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        // An empty subset is routine, e.g. a ride with no cruising
        Err(AnalyticsError::InsufficientData(reason)) => {
            tracing::debug!("{} unavailable: {}", what, reason);
            None
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", what, e);
            None
        }
    }
}
