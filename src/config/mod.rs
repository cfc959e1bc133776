//! Configuration management for Sluice.
//!
//! Sluice uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SLUICE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sluice::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sluice.toml")?;
//!
//! println!("Source: {}", config.export.source_path);
//! println!("Max slice bytes: {}", config.slicer.max_bytes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ExportConfig`] - Export id, data interval, source and destination
//! - [`SlicerConfig`] - Slice size bounds
//! - [`QueueConfig`] - Relay queue capacity
//! - [`DrainConfig`] - Consumer idle timeout
//! - [`FaultInjectionConfig`] - Simulated source failures
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! interval_start = "2025-01-01T00:00:00Z"
//! interval_end = "2025-01-02T00:00:00Z"
//! source_path = "${SLUICE_DATA_DIR}/events.arrow"
//! destination_path = "out/events.arrow"
//!
//! [slicer]
//! max_bytes = 8388608
//! min_records_per_batch = 100
//!
//! [queue]
//! capacity = 64
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, DrainConfig, ExportConfig, FaultInjectionConfig, LoggingConfig,
    QueueConfig, SlicerConfig, SluiceConfig,
};
