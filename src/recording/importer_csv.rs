//! CSV import of recorded ride samples.
//!
//! Accepts the ride export layout
//! (`timestamp,elapsed_seconds,power_watts,cadence_rpm,heart_rate_bpm,speed_kmh,...`)
//! as well as any header naming a subset of the recognised columns:
//!
//! - time: `timestamp` (RFC 3339) or `elapsed_seconds`
//! - speed: `speed_mps` or `speed_kmh`
//! - optional: `power_watts`, `cadence_rpm`
//!
//! Unknown columns are ignored and empty cells are absent values.

use crate::recording::types::{ImportError, Sample, SampleSeries};
use chrono::{DateTime, TimeDelta, Utc};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
enum TimeColumn {
    Timestamp(usize),
    Elapsed(usize),
}

#[derive(Debug, Clone, Copy)]
enum SpeedColumn {
    MetresPerSecond(usize),
    KilometresPerHour(usize),
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    time: TimeColumn,
    speed: SpeedColumn,
    power: Option<usize>,
    cadence: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| header.iter().position(|n| n.eq_ignore_ascii_case(name));

        let time = match (find("timestamp"), find("elapsed_seconds")) {
            (Some(i), _) => TimeColumn::Timestamp(i),
            (None, Some(i)) => TimeColumn::Elapsed(i),
            (None, None) => {
                return Err(ImportError::MissingColumn(
                    "timestamp or elapsed_seconds".to_string(),
                ))
            }
        };

        let speed = match (find("speed_mps"), find("speed_kmh")) {
            (Some(i), _) => SpeedColumn::MetresPerSecond(i),
            (None, Some(i)) => SpeedColumn::KilometresPerHour(i),
            (None, None) => {
                return Err(ImportError::MissingColumn(
                    "speed_mps or speed_kmh".to_string(),
                ))
            }
        };

        Ok(Self {
            time,
            speed,
            power: find("power_watts"),
            cadence: find("cadence_rpm"),
        })
    }
}

/// Parse CSV text into a validated sample series.
///
/// Rows are sorted by time and duplicate timestamps are coalesced, keeping
/// the first row. Rows without a speed value are skipped.
pub fn import_csv(content: &str) -> Result<SampleSeries, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(ImportError::NoData);
    }
    let columns = Columns::from_header(&header)?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let cell = |i: usize| record.get(i).filter(|c| !c.is_empty());

        let speed_mps = match columns.speed {
            SpeedColumn::MetresPerSecond(i) => parse_number(cell(i), line)?,
            SpeedColumn::KilometresPerHour(i) => parse_number(cell(i), line)?.map(|v| v / 3.6),
        };
        let Some(speed_mps) = speed_mps else {
            skipped += 1;
            continue;
        };

        let timestamp = match columns.time {
            TimeColumn::Timestamp(i) => {
                let raw = cell(i).ok_or_else(|| parse_error(line, "missing timestamp"))?;
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| parse_error(line, &format!("bad timestamp '{}': {}", raw, e)))?
                    .with_timezone(&Utc)
            }
            TimeColumn::Elapsed(i) => {
                let secs = parse_number(cell(i), line)?
                    .ok_or_else(|| parse_error(line, "missing elapsed_seconds"))?;
                elapsed_to_timestamp(secs)
                    .ok_or_else(|| parse_error(line, &format!("elapsed_seconds {} out of range", secs)))?
            }
        };

        let power = match columns.power {
            Some(i) => parse_number(cell(i), line)?,
            None => None,
        };
        let cadence = match columns.cadence {
            Some(i) => parse_number(cell(i), line)?,
            None => None,
        };

        samples.push(
            Sample::new(timestamp, speed_mps)
                .with_power(power)
                .with_cadence(cadence),
        );
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} rows without speed", skipped);
    }
    if samples.is_empty() {
        return Err(ImportError::NoData);
    }

    samples.sort_by_key(|s| s.timestamp);
    let before = samples.len();
    samples.dedup_by_key(|s| s.timestamp);
    if samples.len() < before {
        tracing::warn!(
            "Dropped {} rows with duplicate timestamps",
            before - samples.len()
        );
    }

    Ok(SampleSeries::new(samples)?)
}

/// Read and parse a CSV ride file.
pub fn import_csv_file(path: &Path) -> Result<SampleSeries, ImportError> {
    let content = std::fs::read_to_string(path)?;
    let series = import_csv(&content)?;
    tracing::info!("Imported {} samples from {}", series.len(), path.display());
    Ok(series)
}

/// Seconds after the Unix epoch, or `None` if not representable.
fn elapsed_to_timestamp(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1e6).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    let offset = TimeDelta::microseconds(micros as i64);
    DateTime::<Utc>::UNIX_EPOCH.checked_add_signed(offset)
}

fn parse_number(cell: Option<&str>, line: usize) -> Result<Option<f64>, ImportError> {
    cell.map(|raw| {
        raw.parse::<f64>()
            .map_err(|_| parse_error(line, &format!("'{}' is not a number", raw)))
    })
    .transpose()
}

fn parse_error(line: usize, message: &str) -> ImportError {
    ImportError::Parse {
        line,
        message: message.to_string(),
    }
}
