//! Domain error types
//!
//! This module defines the error hierarchy for Sluice. Errors are
//! domain-specific and don't expose third-party types to callers.

use thiserror::Error;

/// Main Sluice error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised by a batch source while streaming
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Slicer called with bounds it cannot honor
    #[error("Invalid slice bounds: max_bytes={max_bytes}, min_records={min_records}")]
    InvalidSliceBounds { max_bytes: usize, min_records: usize },

    /// The consumer side of the relay queue went away
    #[error("Relay queue closed: {0}")]
    QueueClosed(String),

    /// No batch arrived within the configured drain idle timeout
    #[error("No batch received for {waited_ms}ms while producer was still running")]
    DrainTimeout { waited_ms: u128 },

    /// Run lifecycle bookkeeping errors
    #[error("Run state error: {0}")]
    State(String),

    /// Destination write errors
    #[error("Destination error: {0}")]
    Destination(String),

    /// A spawned task panicked or was aborted
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Export cancelled by a shutdown signal
    #[error("Export cancelled")]
    Cancelled,

    /// Arrow compute or encoding errors
    #[error("Arrow error: {0}")]
    Arrow(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Batch source errors
///
/// These are part of the pipeline contract: the producer propagates them
/// unchanged so the orchestration layer can decide what to do with a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Upstream data could not be decoded into a valid record batch
    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    /// The source could not be opened or reached
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Whether this is the malformed-message failure mode
    pub fn is_malformed(&self) -> bool {
        matches!(self, SourceError::MalformedStream(_))
    }
}

impl RelayError {
    /// Whether the error originated in the batch source
    pub fn is_source_error(&self) -> bool {
        matches!(self, RelayError::Source(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RelayError {
    fn from(err: toml::de::Error) -> Self {
        RelayError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<arrow::error::ArrowError> for RelayError {
    fn from(err: arrow::error::ArrowError) -> Self {
        RelayError::Arrow(err.to_string())
    }
}
