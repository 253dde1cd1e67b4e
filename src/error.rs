//! Configuration validation errors.
//!
//! Only configuration problems surface as errors; every numerical step of the
//! clustering loop recovers locally (degenerate allocations fall back to a
//! single cluster, empty clusters collapse to the zero center).

use thiserror::Error;

/// Result type alias for clustering operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised by input validation before any computation begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The data matrix has no rows.
    #[error("data matrix must contain at least one row")]
    EmptyData,

    /// Ingress rows do not all share the same width.
    #[error("ragged input: row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Requested cluster count is zero or exceeds the number of rows.
    #[error("cluster count k={k} is invalid for {rows} data rows (need 1 <= k <= rows)")]
    InvalidK { k: usize, rows: usize },

    /// Regularization strength must be non-negative.
    #[error("regularization must be non-negative, got {0}")]
    NegativeReg(f64),

    /// A search grid axis is empty.
    #[error("search grid axis `{0}` must not be empty")]
    EmptyGrid(&'static str),

    /// The search was asked to run zero repetitions.
    #[error("search iterations must be positive")]
    ZeroIterations,

    /// The bootstrap sample size is zero.
    #[error("bootstrap sample size must be positive")]
    ZeroBootstrap,
}
