//! CruiseRide - Cruising Speed and Power Analysis
//!
//! Splits a recorded ride into stopped, transition and cruising phases and
//! computes Normalized Power, Intensity Factor and speed/power distributions.

pub mod metrics;
pub mod recording;
pub mod storage;

// Re-export commonly used types
pub use metrics::analysis::{AnalysisResult, RideAnalyzer};
pub use metrics::error::{AnalyticsError, AnalyticsResult};
pub use recording::types::{Sample, SampleSeries};
pub use storage::config::AnalysisConfig;
