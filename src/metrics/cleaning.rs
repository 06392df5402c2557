//! Power artifact filtering and gap interpolation.

use serde::Serialize;

/// Power filter for removing sensor artifacts.
#[derive(Debug, Clone, Copy)]
pub struct PowerFilter {
    /// Maximum valid power value
    max_power: f64,
}

impl PowerFilter {
    /// Create a filter that rejects readings above `max_power`.
    pub fn new(max_power: f64) -> Self {
        Self { max_power }
    }

    /// Filter a power value.
    ///
    /// Returns `None` for readings that are negative, non-finite or above the
    /// limit. Rejected readings are removed, never clamped.
    pub fn filter(&self, power: f64) -> Option<f64> {
        if !power.is_finite() || power < 0.0 || power > self.max_power {
            None
        } else {
            Some(power)
        }
    }
}

/// Power values after filtering and optional interpolation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PowerTrack {
    /// One value per sample; `None` where no usable power exists
    pub values: Vec<Option<f64>>,
    /// Readings removed as artifacts
    pub rejected: usize,
    /// Samples filled by interpolation
    pub interpolated: usize,
}

impl PowerTrack {
    /// Number of samples carrying power.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Present values in order.
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// Options controlling [`clean_power`].
#[derive(Debug, Clone, Copy)]
pub struct CleaningOptions {
    pub max_power: f64,
    pub interpolate: bool,
    pub max_gap_secs: Option<f64>,
}

/// Remove artifacts from raw power and optionally fill the gaps.
pub fn clean_power(offsets: &[f64], raw: &[Option<f64>], options: CleaningOptions) -> PowerTrack {
    let filter = PowerFilter::new(options.max_power);

    let mut rejected = 0;
    let values: Vec<Option<f64>> = raw
        .iter()
        .map(|reading| match reading {
            Some(p) => {
                let kept = filter.filter(*p);
                if kept.is_none() {
                    rejected += 1;
                }
                kept
            }
            None => None,
        })
        .collect();

    if rejected > 0 {
        tracing::debug!("Rejected {} power readings as artifacts", rejected);
    }

    if !options.interpolate {
        return PowerTrack {
            values,
            rejected,
            interpolated: 0,
        };
    }

    let before = values.iter().filter(|v| v.is_none()).count();
    let values = interpolate_gaps(offsets, &values, options.max_gap_secs);
    let after = values.iter().filter(|v| v.is_none()).count();

    PowerTrack {
        values,
        rejected,
        interpolated: before - after,
    }
}

/// Fill absent values by time-linear interpolation.
///
/// Interior gaps are interpolated between the nearest present neighbours;
/// leading and trailing gaps copy the nearest present value. A gap spanning
/// more than `max_gap_secs` is left untouched. With no present value at all the
/// input is returned unchanged.
pub fn interpolate_gaps(offsets: &[f64], values: &[Option<f64>], max_gap_secs: Option<f64>) -> Vec<Option<f64>> {
    let mut filled = values.to_vec();
    let present: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (Some(&first), Some(&last)) = (present.first(), present.last()) else {
        return filled;
    };
    let within_limit = |span: f64| max_gap_secs.map_or(true, |limit| span <= limit);

    // Leading gap
    if first > 0 && within_limit(offsets[first] - offsets[0]) {
        for slot in &mut filled[..first] {
            *slot = values[first];
        }
    }

    // Trailing gap
    let end = values.len() - 1;
    if last < end && within_limit(offsets[end] - offsets[last]) {
        for slot in &mut filled[last + 1..] {
            *slot = values[last];
        }
    }

    // Interior gaps
    for pair in present.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi - lo < 2 {
            continue;
        }
        let (t0, t1) = (offsets[lo], offsets[hi]);
        let span = t1 - t0;
        if !within_limit(span) {
            continue;
        }
        let (v0, v1) = match (values[lo], values[hi]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        for i in lo + 1..hi {
            let ratio = if span > 0.0 { (offsets[i] - t0) / span } else { 0.0 };
            filled[i] = Some(v0 + ratio * (v1 - v0));
        }
    }

    filled
}
