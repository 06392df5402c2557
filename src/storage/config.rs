//! Analysis configuration.
//!
//! Loaded from TOML; every section falls back to its defaults so a partial
//! file only overrides what it names.

use crate::metrics::error::{AnalyticsError, AnalyticsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Phase segmentation settings
    pub segmentation: SegmentationSettings,
    /// Power metric settings
    pub power: PowerSettings,
    /// Distribution settings
    pub distribution: DistributionSettings,
}

impl AnalysisConfig {
    /// Check every section.
    pub fn validate(&self) -> AnalyticsResult<()> {
        self.segmentation.validate()?;
        self.power.validate()?;
        self.distribution.validate()
    }
}

/// Thresholds for the phase segmenter. Speeds in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Speed below this is eligible to be "stopped"
    pub stop_speed_threshold: f64,
    /// Speed must be at or above this to be eligible for "cruising"
    pub min_cruising_speed: f64,
    /// Max |acceleration| (m/s²) to remain in a stable phase
    pub acceleration_threshold: f64,
    /// Minimum contiguous low-speed time to confirm a stop
    pub stop_duration_min_secs: f64,
    /// Window for the speed-stability computation
    pub rolling_window_secs: f64,
    /// Multiplier on `stop_speed_threshold` giving the max rolling std for cruising
    pub speed_std_factor: f64,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            stop_speed_threshold: 2.0 / 3.6,
            min_cruising_speed: 10.0 / 3.6,
            acceleration_threshold: 1.5,
            stop_duration_min_secs: 5.0,
            rolling_window_secs: 5.0,
            speed_std_factor: 4.0,
        }
    }
}

impl SegmentationSettings {
    /// Max rolling speed std that still counts as stable.
    pub fn max_speed_std_dev(&self) -> f64 {
        self.speed_std_factor * self.stop_speed_threshold
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        non_negative("stop_speed_threshold", self.stop_speed_threshold)?;
        non_negative("min_cruising_speed", self.min_cruising_speed)?;
        non_negative("acceleration_threshold", self.acceleration_threshold)?;
        non_negative("stop_duration_min_secs", self.stop_duration_min_secs)?;
        non_negative("rolling_window_secs", self.rolling_window_secs)?;
        non_negative("speed_std_factor", self.speed_std_factor)?;

        if self.min_cruising_speed < self.stop_speed_threshold {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "min_cruising_speed ({}) must be at least stop_speed_threshold ({})",
                self.min_cruising_speed, self.stop_speed_threshold
            )));
        }
        Ok(())
    }
}

/// Settings for power cleaning and Normalized Power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    /// Normalized Power rolling window
    pub np_window_secs: f64,
    /// Functional Threshold Power in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftp: Option<f64>,
    /// Readings above this are sensor artifacts
    pub power_max_threshold: f64,
    /// Fill absent/rejected power by linear interpolation
    pub power_interpolate: bool,
    /// Longest gap that interpolation may bridge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_interpolation_gap_secs: Option<f64>,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            np_window_secs: 30.0,
            ftp: None,
            power_max_threshold: 3000.0,
            power_interpolate: true,
            max_interpolation_gap_secs: None,
        }
    }
}

impl PowerSettings {
    pub fn validate(&self) -> AnalyticsResult<()> {
        non_negative("np_window_secs", self.np_window_secs)?;
        non_negative("power_max_threshold", self.power_max_threshold)?;
        if let Some(ftp) = self.ftp {
            non_negative("ftp", ftp)?;
        }
        if let Some(gap) = self.max_interpolation_gap_secs {
            non_negative("max_interpolation_gap_secs", gap)?;
        }
        Ok(())
    }

    /// FTP usable for Intensity Factor, if configured and positive.
    pub fn effective_ftp(&self) -> Option<f64> {
        self.ftp.filter(|ftp| *ftp > 0.0)
    }
}

/// Settings for distribution summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSettings {
    /// Number of histogram bins
    pub histogram_bins: usize,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self { histogram_bins: 20 }
    }
}

impl DistributionSettings {
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.histogram_bins == 0 {
            return Err(AnalyticsError::InvalidConfiguration(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidConfiguration(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )))
    }
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "cruiseride", "CruiseRide")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file yields the defaults. The loaded configuration is validated.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    let path = path.map_or_else(get_config_path, Path::to_path_buf);

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AnalysisConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    let config = parse_config(&content)?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate a TOML configuration.
pub fn parse_config(content: &str) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Render a configuration as TOML.
pub fn config_to_toml(config: &AnalysisConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
}

/// Save configuration to `path`, or to the default location.
pub fn save_config(config: &AnalysisConfig, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(get_config_path, Path::to_path_buf);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = config_to_toml(config)?;
    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(path)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error(transparent)]
    Invalid(#[from] AnalyticsError),
}
