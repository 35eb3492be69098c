//! Error types for logvec
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LogVecError
pub type Result<T> = std::result::Result<T, LogVecError>;

/// Unified error type for logvec operations
#[derive(Debug, Error)]
pub enum LogVecError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Sequence Errors
    // -------------------------------------------------------------------------
    #[error("Index {index} out of range for sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    /// The durable write behind a mutation failed; the mutation was not applied.
    #[error("Log append failed: {0}")]
    AppendFailure(#[source] std::io::Error),

    /// A record read during replay is malformed, truncated, or describes an
    /// impossible mutation. `offset` is where the offending record starts.
    #[error("Log parse error at byte {offset}: {reason}")]
    ParseError { offset: u64, reason: String },

    #[error("{field} {value} does not fit in a {max_digits}-digit log field")]
    FieldTooWide {
        field: &'static str,
        value: usize,
        max_digits: usize,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
