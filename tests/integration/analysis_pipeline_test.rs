//! Integration tests for the full analysis pipeline.
//!
//! Covers segmentation, power metrics and partial results end to end
//! through `RideAnalyzer`.

use super::ride_fixtures::{series_1hz, simulate_commute, RideBuilder};
use cruiseride::metrics::{Phase, RideAnalyzer};
use cruiseride::storage::{AnalysisConfig, SegmentationSettings};
use cruiseride::AnalyticsError;

fn analyzer(config: AnalysisConfig) -> RideAnalyzer {
    RideAnalyzer::new(config).unwrap()
}

#[test]
fn test_reference_ride_labels() {
    use Phase::*;

    let speeds = [0.0, 0.0, 0.0, 5.0, 6.0, 6.0, 6.0, 5.0, 0.0, 0.0];
    let ride = series_1hz(&speeds, &[None; 10]);

    let mut config = AnalysisConfig::default();
    config.segmentation = SegmentationSettings {
        stop_speed_threshold: 1.0,
        min_cruising_speed: 4.0,
        stop_duration_min_secs: 2.0,
        acceleration_threshold: 2.0,
        rolling_window_secs: 3.0,
        ..Default::default()
    };

    let result = analyzer(config).analyze(&ride).unwrap();
    assert_eq!(
        result.labels(),
        &[Stopped, Stopped, Stopped, Transition, Cruising, Cruising, Cruising, Transition, Stopped, Stopped]
    );
    assert_eq!(result.phase_breakdown.stop_count, 2);
    assert_eq!(result.phase_breakdown.cruising_run_count, 1);
}

#[test]
fn test_labels_partition_the_ride() {
    let ride = simulate_commute();
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    assert_eq!(result.labels().len(), ride.len());

    let runs = result.runs();
    assert_eq!(runs[0].start_index, 0);
    assert_eq!(runs.last().unwrap().end_index, ride.len() - 1);
    for pair in runs.windows(2) {
        assert_eq!(pair[0].end_index + 1, pair[1].start_index);
        assert_ne!(pair[0].phase, pair[1].phase);
    }
    for run in runs {
        assert!(result.labels()[run.start_index..=run.end_index]
            .iter()
            .all(|&p| p == run.phase));
    }

    let total = result.phase_breakdown.total_secs();
    assert!((total - result.duration_secs).abs() < 1e-9);
}

#[test]
fn test_confirmed_stops_meet_minimum_duration() {
    let ride = simulate_commute();
    let config = AnalysisConfig::default();
    let result = analyzer(config).analyze(&ride).unwrap();

    let stops: Vec<_> = result.segmentation.runs_of(Phase::Stopped).collect();
    // The start and the final stop; the 3 s traffic light is too short
    assert_eq!(stops.len(), 2);
    for stop in stops {
        assert!(stop.duration_secs >= config.segmentation.stop_duration_min_secs);
    }
    assert_eq!(result.phase_breakdown.stopped_secs, 31.0);
}

#[test]
fn test_cruising_samples_meet_minimum_speed() {
    let ride = simulate_commute();
    let config = AnalysisConfig::default();
    let result = analyzer(config).analyze(&ride).unwrap();

    let speeds = ride.speeds();
    let cruising: Vec<usize> = result.segmentation.indices_of(Phase::Cruising).collect();
    assert!(!cruising.is_empty());
    for i in cruising {
        assert!(speeds[i] >= config.segmentation.min_cruising_speed);
    }

    let summary = result.cruising.unwrap();
    assert!(summary.cruising_speed_mps > 7.5 && summary.cruising_speed_mps < 9.5);
    assert!(summary.cruising_fraction > 0.5);
    assert_eq!(summary.average_cadence, Some(88.0));
}

#[test]
fn test_constant_power_normalized_power() {
    let ride = series_1hz(&[8.0; 60], &[Some(200.0); 60]);
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    let power = result.metrics.power.unwrap();
    assert!((power.normalized_power - 200.0).abs() < 1e-9);
    assert!((power.average_power.unwrap() - 200.0).abs() < 1e-9);
    assert!((power.variability_index.unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(power.intensity_factor, None);
}

#[test]
fn test_absent_power_is_a_partial_result() {
    let ride = series_1hz(&[8.0; 60], &[None; 60]);

    let mut config = AnalysisConfig::default();
    config.power.ftp = Some(250.0);
    config.power.power_interpolate = false;
    let result = analyzer(config).analyze(&ride).unwrap();

    assert_eq!(result.metrics.normalized_power(), Some(0.0));
    assert_eq!(result.metrics.intensity_factor(), None);
    assert!(result.metrics.power_distribution.is_none());
    assert!(result.metrics.cruising_power_distribution.is_none());

    // Speed analysis is unaffected
    assert!(result.metrics.speed_distribution.is_some());
    assert!(result.metrics.cruising_speed_distribution.is_some());
    assert!(result.cruising.is_some());
}

#[test]
fn test_intensity_factor_follows_ftp() {
    let ride = simulate_commute();

    let without = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();
    assert_eq!(without.metrics.intensity_factor(), None);
    assert!(without.metrics.time_in_zones.is_none());

    let mut config = AnalysisConfig::default();
    config.power.ftp = Some(250.0);
    let with = analyzer(config).analyze(&ride).unwrap();

    let np = with.metrics.normalized_power().unwrap();
    let if_value = with.metrics.intensity_factor().unwrap();
    assert!((if_value - np / 250.0).abs() < 1e-12);

    let zones = with.metrics.time_in_zones.unwrap();
    let zone_secs: f64 = zones.iter().map(|z| z.seconds).sum();
    assert!((zone_secs - ride.total_duration_secs()).abs() < 1e-9);
}

#[test]
fn test_power_dropout_is_interpolated() {
    let ride = simulate_commute();
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    let power = result.metrics.power.unwrap();
    assert_eq!(power.interpolated_samples, 10);
    assert_eq!(power.valid_samples, ride.len());
    assert_eq!(power.rejected_samples, 0);

    let mut config = AnalysisConfig::default();
    config.power.power_interpolate = false;
    let raw = analyzer(config).analyze(&ride).unwrap();
    assert_eq!(raw.metrics.power.unwrap().valid_samples, ride.len() - 10);
}

#[test]
fn test_artifacts_are_removed() {
    let ride = RideBuilder::new()
        .hold(30, 8.0, Some(200.0))
        .hold(1, 8.0, Some(5000.0))
        .hold(29, 8.0, Some(200.0))
        .build();
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    let power = result.metrics.power.unwrap();
    assert_eq!(power.rejected_samples, 1);
    assert_eq!(power.max_power, Some(200.0));
    assert!((power.normalized_power - 200.0).abs() < 1e-9);
}

#[test]
fn test_stationary_ride_has_no_cruising() {
    let ride = series_1hz(&[0.0; 30], &[Some(0.0); 30]);
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    assert!(result.cruising.is_none());
    assert!(result.metrics.cruising_speed_distribution.is_none());
    assert_eq!(result.phase_breakdown.stop_count, 1);
    assert_eq!(result.metrics.normalized_power(), Some(0.0));
}

#[test]
fn test_inconsistent_thresholds_rejected() {
    let mut config = AnalysisConfig::default();
    config.segmentation.min_cruising_speed = config.segmentation.stop_speed_threshold / 2.0;

    assert!(matches!(
        RideAnalyzer::new(config),
        Err(AnalyticsError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_result_serializes_to_json() {
    let ride = simulate_commute();
    let result = analyzer(AnalysisConfig::default()).analyze(&ride).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["segmentation"]["labels"][0], "stopped");
    assert!(json["metrics"]["power"]["normalized_power"].is_number());
}
