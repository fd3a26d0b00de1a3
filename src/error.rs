//! Error types for the path homology pipeline
//!
//! Every failure here is a programmer or data error: the computation is
//! deterministic, so nothing is retried.

use thiserror::Error;

/// Errors raised while building, reducing or mapping a path complex
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HomologyError {
    /// Malformed input: negative or NaN weights, non-monotone entrance times,
    /// unknown endpoints, invalid configuration values
    #[error("Invalid input: {0}")]
    Input(String),

    /// A column references a face that is not present in the working cell set
    #[error("Inconsistent complex: {0}")]
    InconsistentComplex(String),

    /// Cell dimension outside {0, 1, 2}
    #[error("Unsupported cell dimension {0}: cells are generated up to dimension 2")]
    UnsupportedDimension(usize),

    /// A node, edge, label or image cell could not be found
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// A dedicated worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HomologyError>;

impl From<rayon::ThreadPoolBuildError> for HomologyError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        HomologyError::ThreadPool(err.to_string())
    }
}
