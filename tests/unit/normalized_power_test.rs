//! Unit tests for Normalized Power, Intensity Factor and TSS.

use chrono::{Duration, TimeZone, Utc};
use cruiseride::metrics::calculator::{
    intensity_factor, normalized_power, training_stress_score, MetricsCalculator,
};
use cruiseride::storage::PowerSettings;
use cruiseride::{Sample, SampleSeries};

fn one_hz(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// One-minute blocks alternating around `mean` by `amplitude`.
fn block_workout(mean: f64, amplitude: f64, secs: usize) -> Vec<Option<f64>> {
    (0..secs)
        .map(|i| {
            let high = (i / 60) % 2 == 0;
            Some(if high { mean + amplitude } else { mean - amplitude })
        })
        .collect()
}

fn series_with_power(power: &[Option<f64>]) -> SampleSeries {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let samples = power
        .iter()
        .enumerate()
        .map(|(i, &p)| Sample::new(t0 + Duration::seconds(i as i64), 8.0).with_power(p))
        .collect();
    SampleSeries::new(samples).unwrap()
}

#[test]
fn test_constant_power_is_idempotent() {
    for watts in [50.0, 200.0, 415.0] {
        let np = normalized_power(&one_hz(60), &vec![Some(watts); 60], 30.0).unwrap();
        assert!((np - watts).abs() < 1e-9, "NP {} for constant {}", np, watts);
    }
}

#[test]
fn test_normalized_power_grows_with_variability() {
    let offsets = one_hz(240);
    let mut previous = 0.0;
    for amplitude in [0.0, 25.0, 50.0, 75.0, 100.0, 150.0] {
        let np = normalized_power(&offsets, &block_workout(200.0, amplitude, 240), 30.0).unwrap();
        assert!(np >= previous - 1e-9, "NP fell to {} at amplitude {}", np, amplitude);
        previous = np;
    }
    assert!(previous > 200.0);
}

#[test]
fn test_short_ride_uses_available_prefix() {
    // Shorter than the window: every sample still yields a rolling mean
    let np = normalized_power(&one_hz(10), &[Some(300.0); 10], 30.0).unwrap();
    assert!((np - 300.0).abs() < 1e-9);
}

#[test]
fn test_intensity_factor_property() {
    assert_eq!(intensity_factor(230.0, None), None);
    for ftp in [150.0, 250.0, 333.0] {
        let value = intensity_factor(230.0, Some(ftp)).unwrap();
        assert!((value - 230.0 / ftp).abs() < 1e-12);
    }
}

#[test]
fn test_training_stress_score_scales_with_time() {
    let half = training_stress_score(1800.0, 0.8);
    let full = training_stress_score(3600.0, 0.8);
    assert!((full - 64.0).abs() < 1e-9);
    assert!((full - 2.0 * half).abs() < 1e-9);
}

#[test]
fn test_calculator_totals() {
    let power = vec![Some(250.0); 3600];
    let series = series_with_power(&power);
    let settings = PowerSettings {
        ftp: Some(250.0),
        ..Default::default()
    };
    let calculator = MetricsCalculator::new(settings);
    let track = calculator.clean(&series);
    let metrics = calculator.calculate(&series, &track).unwrap();

    assert!((metrics.normalized_power - 250.0).abs() < 1e-9);
    assert!((metrics.intensity_factor.unwrap() - 1.0).abs() < 1e-9);
    assert!((metrics.training_stress_score.unwrap() - 100.0).abs() < 1e-6);
    // 250 W for an hour is 900 kJ
    assert!((metrics.work_kj.unwrap() - 900.0).abs() < 1e-6);
    assert_eq!(metrics.valid_samples, 3600);
}

#[test]
fn test_calculator_rejects_artifacts_without_clamping() {
    let mut power = vec![Some(200.0); 60];
    power[10] = Some(-5.0);
    power[20] = Some(4000.0);
    power[30] = Some(f64::NAN);
    let series = series_with_power(&power);

    let settings = PowerSettings {
        power_interpolate: false,
        ..Default::default()
    };
    let calculator = MetricsCalculator::new(settings);
    let track = calculator.clean(&series);
    let metrics = calculator.calculate(&series, &track).unwrap();

    assert_eq!(metrics.rejected_samples, 3);
    assert_eq!(metrics.valid_samples, 57);
    assert_eq!(metrics.max_power, Some(200.0));
    assert!((metrics.normalized_power - 200.0).abs() < 1e-9);
}
