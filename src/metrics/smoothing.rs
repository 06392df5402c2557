//! Time-bounded rolling statistics.
//!
//! The window ending at a sample taken at `t` holds every present value
//! recorded in `(t - window, t]`, so a 30-second window over 1 Hz data holds
//! exactly 30 samples. Early samples see only the available prefix.

use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use serde::Serialize;
use std::collections::VecDeque;

/// Tolerance for window edge comparisons on fractional timestamps.
const EDGE_EPSILON: f64 = 1e-9;

/// Statistics of one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WindowStats {
    /// Mean of the present values, if any
    pub mean: Option<f64>,
    /// Sample standard deviation (0 for a single value)
    pub std_dev: Option<f64>,
    /// Number of present values in the window
    pub count: usize,
}

/// Incremental rolling mean/variance accumulator over a time window.
#[derive(Debug)]
pub struct RollingWindow {
    /// Window length in seconds
    window_secs: f64,
    /// (timestamp, value) pairs currently in the window
    buffer: VecDeque<(f64, f64)>,
    /// Reference value subtracted before accumulation
    shift: f64,
    /// Running sum of shifted values
    sum: f64,
    /// Running sum of squared shifted values
    sum_sq: f64,
}

impl RollingWindow {
    /// Create a rolling window of the given length in seconds.
    pub fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            buffer: VecDeque::new(),
            shift: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Advance the window to `time` and add `value` if present.
    ///
    /// Returns the statistics of the window ending at `time`.
    pub fn push(&mut self, time: f64, value: Option<f64>) -> WindowStats {
        let cutoff = time - self.window_secs + EDGE_EPSILON;
        while let Some(&(t, old)) = self.buffer.front() {
            if t > cutoff {
                break;
            }
            self.buffer.pop_front();
            let d = old - self.shift;
            self.sum -= d;
            self.sum_sq -= d * d;
        }

        if self.buffer.is_empty() {
            // Re-anchor so the accumulators stay near zero
            self.sum = 0.0;
            self.sum_sq = 0.0;
            if let Some(v) = value {
                self.shift = v;
            }
        }

        if let Some(v) = value {
            self.buffer.push_back((time, v));
            let d = v - self.shift;
            self.sum += d;
            self.sum_sq += d * d;
        }

        self.stats()
    }

    /// Statistics of the current window contents.
    pub fn stats(&self) -> WindowStats {
        WindowStats {
            mean: self.mean(),
            std_dev: self.std_dev(),
            count: self.len(),
        }
    }

    /// Mean of the values in the window.
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.shift + self.sum / self.len() as f64)
        }
    }

    /// Sample standard deviation of the values in the window.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.len();
        match n {
            0 => None,
            1 => Some(0.0),
            _ => {
                let n = n as f64;
                let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
                Some(variance.max(0.0).sqrt())
            }
        }
    }

    /// Number of present values in the window.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the window holds no present value.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Rolling statistics for every index of a possibly gappy series.
///
/// `offsets` are sample times in seconds and must be non-decreasing. Absent
/// values are excluded from every window that would contain them.
pub fn rolling_statistics(
    offsets: &[f64],
    values: &[Option<f64>],
    window_secs: f64,
) -> AnalyticsResult<Vec<WindowStats>> {
    if values.is_empty() {
        return Err(AnalyticsError::InvalidInput(
            "rolling statistics need at least one value".to_string(),
        ));
    }
    if offsets.len() != values.len() {
        return Err(AnalyticsError::InvalidInput(format!(
            "{} timestamps for {} values",
            offsets.len(),
            values.len()
        )));
    }
    if !window_secs.is_finite() || window_secs < 0.0 {
        return Err(AnalyticsError::InvalidInput(format!(
            "window length {} must be finite and non-negative",
            window_secs
        )));
    }

    let mut window = RollingWindow::new(window_secs);
    Ok(offsets
        .iter()
        .zip(values)
        .map(|(&t, &v)| window.push(t, v))
        .collect())
}
