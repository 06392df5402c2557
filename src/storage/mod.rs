//! Storage module for configuration files.

pub mod config;

pub use config::{
    load_config, save_config, AnalysisConfig, ConfigError, DistributionSettings, PowerSettings,
    SegmentationSettings,
};
