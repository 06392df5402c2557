//! Distribution summaries: descriptive statistics, percentiles and histograms.

use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use serde::Serialize;

/// Percentile points reported for every distribution.
pub const DEFAULT_PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Descriptive statistics of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (0 for a single value)
    pub std_dev: f64,
}

impl SummaryStats {
    /// Compute statistics from values sorted in ascending order.
    pub fn from_sorted(sorted: &[f64]) -> AnalyticsResult<Self> {
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Err(AnalyticsError::InsufficientData(
                "no values to summarize".to_string(),
            ));
        };

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            count: n,
            min,
            max,
            mean,
            median: percentile(sorted, 50.0),
            std_dev,
        })
    }
}

/// A single percentile value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentile {
    /// Percentile point (0-100)
    pub percentile: f64,
    pub value: f64,
}

/// One histogram bin covering `[lower, upper)`; the last bin is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Distribution summary of one quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub summary: SummaryStats,
    pub percentiles: Vec<Percentile>,
    pub histogram: Vec<HistogramBin>,
}

impl Distribution {
    /// Summarize `values` with an equal-width histogram of `bins` bins.
    ///
    /// Fails with `InsufficientData` when `values` is empty.
    pub fn from_values<I>(values: I, bins: usize) -> AnalyticsResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        sorted.sort_by(f64::total_cmp);

        let summary = SummaryStats::from_sorted(&sorted)?;
        let percentiles = DEFAULT_PERCENTILES
            .iter()
            .map(|&p| Percentile {
                percentile: p,
                value: percentile(&sorted, p),
            })
            .collect();
        let histogram = histogram(&sorted, bins.max(1));

        Ok(Self {
            summary,
            percentiles,
            histogram,
        })
    }

    /// Value at a reported percentile point.
    pub fn percentile(&self, point: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| (p.percentile - point).abs() < f64::EPSILON)
            .map(|p| p.value)
    }
}

/// Percentile of sorted data by linear interpolation between closest ranks.
///
/// Returns NaN for empty input.
pub fn percentile(sorted: &[f64], point: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (point.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

fn histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for &v in sorted {
        let index = (((v - min) / width).floor() as usize).min(bins - 1);
        out[index].count += 1;
    }
    out
}
