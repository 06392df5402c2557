//! Coggan power zones and time-in-zone reduction.

use serde::Serialize;

/// Zone names and upper bounds as fractions of FTP.
const COGGAN_ZONES: [(&str, f64); 7] = [
    ("Active Recovery", 0.55),
    ("Endurance", 0.75),
    ("Tempo", 0.90),
    ("Threshold", 1.05),
    ("VO2max", 1.20),
    ("Anaerobic", 1.50),
    ("Neuromuscular", f64::INFINITY),
];

/// A power zone range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRange {
    /// Zone number (1-7)
    pub zone: u8,
    pub name: &'static str,
    /// Lower bound in watts (exclusive except for zone 1)
    pub min_watts: f64,
    /// Upper bound in watts (inclusive); infinite for zone 7
    pub max_watts: f64,
}

/// Coggan 7-zone power zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerZones {
    pub ftp: f64,
    zones: Vec<ZoneRange>,
}

impl PowerZones {
    /// Calculate power zones from FTP.
    pub fn from_ftp(ftp: f64) -> Self {
        let mut lower = 0.0;
        let zones = COGGAN_ZONES
            .iter()
            .enumerate()
            .map(|(i, &(name, fraction))| {
                let upper = ftp * fraction;
                let range = ZoneRange {
                    zone: i as u8 + 1,
                    name,
                    min_watts: lower,
                    max_watts: upper,
                };
                lower = upper;
                range
            })
            .collect();

        Self { ftp, zones }
    }

    /// Get the zone for a given power value.
    pub fn get_zone(&self, power: f64) -> u8 {
        self.zones
            .iter()
            .find(|z| power <= z.max_watts)
            .map_or(7, |z| z.zone)
    }

    /// Get the zone range for a given zone number (1-7).
    pub fn get_zone_range(&self, zone: u8) -> Option<&ZoneRange> {
        self.zones.iter().find(|z| z.zone == zone)
    }

    pub fn all_zones(&self) -> &[ZoneRange] {
        &self.zones
    }

    /// Time spent in each zone.
    ///
    /// `durations` gives the seconds attributed to each sample; samples without
    /// power are skipped. Fractions are relative to the time with power.
    pub fn time_in_zones(&self, power: &[Option<f64>], durations: &[f64]) -> Vec<ZoneTime> {
        let mut seconds = [0.0; 7];
        for (p, dt) in power.iter().zip(durations) {
            if let Some(p) = p {
                seconds[usize::from(self.get_zone(*p)) - 1] += dt;
            }
        }

        let total: f64 = seconds.iter().sum();
        self.zones
            .iter()
            .zip(seconds)
            .map(|(z, secs)| ZoneTime {
                zone: z.zone,
                name: z.name,
                seconds: secs,
                fraction: if total > 0.0 { secs / total } else { 0.0 },
            })
            .collect()
    }
}

/// Time accumulated in one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneTime {
    pub zone: u8,
    pub name: &'static str,
    pub seconds: f64,
    pub fraction: f64,
}
