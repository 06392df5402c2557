//! Analysis error types.

use thiserror::Error;

/// Errors that can occur while segmenting a ride or computing its metrics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Empty or malformed sequence passed to a statistics primitive.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Series too short to segment or summarize.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Timestamps are not strictly increasing.
    #[error("Unsorted input: timestamp at index {index} does not follow its predecessor")]
    UnsortedInput {
        /// Index of the first out-of-order sample.
        index: usize,
    },

    /// Threshold values violate the ordering/non-negativity invariants.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for analysis operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
