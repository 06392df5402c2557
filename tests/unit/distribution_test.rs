//! Unit tests for distribution summaries.

use cruiseride::metrics::distribution::{percentile, Distribution, DEFAULT_PERCENTILES};
use cruiseride::AnalyticsError;

#[test]
fn test_percentiles_of_one_to_hundred() {
    let dist = Distribution::from_values((1..=100).map(f64::from), 10).unwrap();

    assert_eq!(dist.percentiles.len(), DEFAULT_PERCENTILES.len());
    assert!((dist.percentile(50.0).unwrap() - 50.5).abs() < 1e-9);
    assert!((dist.percentile(25.0).unwrap() - 25.75).abs() < 1e-9);
    assert!((dist.percentile(95.0).unwrap() - 95.05).abs() < 1e-9);
    assert_eq!(dist.percentile(42.0), None);
}

#[test]
fn test_histogram_covers_every_value() {
    let dist = Distribution::from_values((1..=100).map(f64::from), 10).unwrap();

    assert_eq!(dist.histogram.len(), 10);
    assert_eq!(dist.histogram.iter().map(|b| b.count).sum::<usize>(), 100);
    assert_eq!(dist.histogram[0].lower, 1.0);
    assert_eq!(dist.histogram[9].upper, 100.0);
    // The maximum lands in the closed last bin
    assert_eq!(dist.histogram[9].count, 10);
}

#[test]
fn test_constant_values_use_one_bin() {
    let dist = Distribution::from_values([7.5; 12], 20).unwrap();

    assert_eq!(dist.histogram.len(), 1);
    assert_eq!(dist.histogram[0].count, 12);
    assert_eq!(dist.summary.std_dev, 0.0);
    assert!(dist.percentiles.iter().all(|p| p.value == 7.5));
}

#[test]
fn test_unsorted_input_is_sorted_first() {
    let dist = Distribution::from_values([9.0, 1.0, 5.0], 3).unwrap();
    assert_eq!(dist.summary.min, 1.0);
    assert_eq!(dist.summary.median, 5.0);
}

#[test]
fn test_empty_values_are_insufficient() {
    let result = Distribution::from_values(std::iter::empty(), 10);
    assert!(matches!(result, Err(AnalyticsError::InsufficientData(_))));
}

#[test]
fn test_percentile_helper_bounds() {
    let sorted = [10.0, 20.0, 30.0];
    assert_eq!(percentile(&sorted, 0.0), 10.0);
    assert_eq!(percentile(&sorted, 100.0), 30.0);
    assert_eq!(percentile(&sorted, 150.0), 30.0);
    assert!(percentile(&[], 50.0).is_nan());
}
