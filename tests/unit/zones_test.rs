//! Unit tests for zone calculations.

use cruiseride::metrics::zones::PowerZones;

#[test]
fn test_power_zones_from_ftp_200() {
    let zones = PowerZones::from_ftp(200.0);

    // Upper bounds: 55/75/90/105/120/150% of FTP
    let uppers: Vec<f64> = zones.all_zones().iter().map(|z| z.max_watts).collect();
    let expected = [110.0, 150.0, 180.0, 210.0, 240.0, 300.0];
    for (got, want) in uppers.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
    }
    assert!(uppers[6].is_infinite());

    // Zones are contiguous
    for pair in zones.all_zones().windows(2) {
        assert_eq!(pair[0].max_watts, pair[1].min_watts);
    }
}

#[test]
fn test_zone_names() {
    let zones = PowerZones::from_ftp(250.0);
    let names: Vec<&str> = zones.all_zones().iter().map(|z| z.name).collect();
    assert_eq!(
        names,
        vec![
            "Active Recovery",
            "Endurance",
            "Tempo",
            "Threshold",
            "VO2max",
            "Anaerobic",
            "Neuromuscular"
        ]
    );
}

#[test]
fn test_zone_boundaries_are_inclusive_above() {
    let zones = PowerZones::from_ftp(100.0);

    assert_eq!(zones.get_zone(55.0), 1);
    assert_eq!(zones.get_zone(55.1), 2);
    assert_eq!(zones.get_zone(100.0), 4);
    assert_eq!(zones.get_zone(150.0), 6);
    assert_eq!(zones.get_zone(2000.0), 7);
}

#[test]
fn test_time_in_zones_skips_absent_power() {
    let zones = PowerZones::from_ftp(200.0);
    let power = [None, Some(50.0), Some(190.0), Some(190.0), None];
    let durations = [1.0; 5];

    let times = zones.time_in_zones(&power, &durations);
    assert_eq!(times.len(), 7);
    assert_eq!(times[0].seconds, 1.0);
    assert_eq!(times[3].seconds, 2.0);
    assert!((times[3].fraction - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_time_in_zones_without_power() {
    let zones = PowerZones::from_ftp(200.0);
    let times = zones.time_in_zones(&[None, None], &[1.0, 1.0]);
    assert!(times.iter().all(|t| t.seconds == 0.0 && t.fraction == 0.0));
}
