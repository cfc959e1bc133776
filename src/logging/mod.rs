//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels (overridable through `RUST_LOG`)
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use sluice::logging::init_logging;
//! use sluice::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use sluice::log_export_start;
/// use sluice::domain::ids::{ExportId, RunId};
///
/// let run_id = RunId::generate();
/// let export_id = ExportId::generate();
/// log_export_start!(&run_id, &export_id);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($run_id:expr, $export_id:expr) => {
        tracing::info!(
            run_id = %$run_id,
            export_id = %$export_id,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use sluice::log_export_complete;
/// use std::time::Duration;
///
/// let records = 42;
/// let duration = Duration::from_secs(10);
/// log_export_complete!(records, duration);
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($records:expr, $duration:expr) => {
        tracing::info!(
            records = $records,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use sluice::log_error_with_context;
/// use sluice::domain::RelayError;
///
/// let error = RelayError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::ids::{ExportId, RunId};
    use crate::domain::RelayError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let run_id = RunId::generate();
        let export_id = ExportId::generate();
        log_export_start!(&run_id, &export_id);
        log_export_complete!(10u64, Duration::from_millis(5));
        log_error_with_context!(&RelayError::Cancelled, "shutdown");
    }
}
