//! Metrics module for ride segmentation and power metrics.

pub mod analysis;
pub mod calculator;
pub mod cleaning;
pub mod cruising;
pub mod distribution;
pub mod error;
pub mod segmentation;
pub mod smoothing;
pub mod zones;

pub use analysis::{AnalysisResult, RideAnalyzer, RideMetrics};
pub use calculator::{MetricsCalculator, PowerMetrics};
pub use cruising::{CruisingSummary, PhaseBreakdown};
pub use distribution::Distribution;
pub use error::{AnalyticsError, AnalyticsResult};
pub use segmentation::{Phase, PhaseRun, PhaseSegmenter, Segmentation};
pub use zones::PowerZones;
