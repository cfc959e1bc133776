//! Configuration schema types
//!
//! This module defines the configuration structure for Sluice.

use crate::core::relay::QueuePolicy;
use crate::core::slicer::SliceBounds;
use crate::domain::ids::ExportId;
use crate::domain::interval::DataInterval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Main Sluice configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SluiceConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// What to export and where
    pub export: ExportConfig,

    /// Slice size bounds
    #[serde(default)]
    pub slicer: SlicerConfig,

    /// Relay queue capacity
    #[serde(default)]
    pub queue: QueueConfig,

    /// Consumer drain behavior
    #[serde(default)]
    pub drain: DrainConfig,

    /// Simulated source failures for recovery testing
    #[serde(default)]
    pub fault_injection: FaultInjectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SluiceConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.slicer.validate()?;
        self.drain.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export identifier (UUID); a fresh one is generated per run when unset
    #[serde(default)]
    pub export_id: Option<String>,

    /// Inclusive start of the data interval (RFC 3339)
    pub interval_start: DateTime<Utc>,

    /// Exclusive end of the data interval (RFC 3339)
    pub interval_end: DateTime<Utc>,

    /// Arrow IPC file to read batches from
    pub source_path: String,

    /// Arrow IPC file to write slices to
    #[serde(default)]
    pub destination_path: String,

    /// Columns to export, in order; empty exports every column
    #[serde(default)]
    pub fields: Vec<String>,

    /// Dry run mode - stream and slice everything but write nothing
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(id) = &self.export_id {
            ExportId::from_str(id)?;
        }

        if self.interval_start >= self.interval_end {
            return Err(format!(
                "export.interval_start ({}) must be before export.interval_end ({})",
                self.interval_start.to_rfc3339(),
                self.interval_end.to_rfc3339()
            ));
        }

        if self.source_path.trim().is_empty() {
            return Err("export.source_path cannot be empty".to_string());
        }

        if !self.dry_run && self.destination_path.trim().is_empty() {
            return Err(
                "export.destination_path cannot be empty unless dry_run is enabled".to_string(),
            );
        }

        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err("export.fields cannot contain empty names".to_string());
        }

        Ok(())
    }

    /// The configured interval
    pub fn data_interval(&self) -> Result<DataInterval, String> {
        DataInterval::new(self.interval_start, self.interval_end)
    }

    /// The configured export id, or a freshly generated one
    pub fn resolve_export_id(&self) -> Result<ExportId, String> {
        match &self.export_id {
            Some(id) => ExportId::from_str(id),
            None => Ok(ExportId::generate()),
        }
    }

    /// Column projection, `None` when every column is exported
    pub fn projection(&self) -> Option<Vec<String>> {
        if self.fields.is_empty() {
            None
        } else {
            Some(self.fields.clone())
        }
    }
}

/// Slicer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// Approximate upper bound on the bytes in one slice
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Rows every slice must reach before the byte bound applies
    #[serde(default = "default_min_records_per_batch")]
    pub min_records_per_batch: usize,
}

impl SlicerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_bytes == 0 {
            return Err("slicer.max_bytes must be > 0".to_string());
        }
        if self.min_records_per_batch == 0 {
            return Err("slicer.min_records_per_batch must be > 0".to_string());
        }
        Ok(())
    }

    pub fn bounds(&self) -> crate::domain::Result<SliceBounds> {
        SliceBounds::new(self.max_bytes, self.min_records_per_batch)
    }
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            min_records_per_batch: default_min_records_per_batch(),
        }
    }
}

/// Relay queue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum slices in flight; 0 means unbounded
    #[serde(default)]
    pub capacity: usize,
}

impl QueueConfig {
    pub fn policy(&self) -> QueuePolicy {
        match self.capacity {
            0 => QueuePolicy::Unbounded,
            n => QueuePolicy::Bounded(n),
        }
    }
}

/// Consumer drain configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrainConfig {
    /// Fail the run if no slice arrives for this long while the producer
    /// is still running; unset waits indefinitely
    #[serde(default)]
    pub idle_timeout_seconds: Option<u64>,
}

impl DrainConfig {
    fn validate(&self) -> Result<(), String> {
        if self.idle_timeout_seconds == Some(0) {
            return Err("drain.idle_timeout_seconds must be > 0 when set".to_string());
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}

/// Fault injection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultInjectionConfig {
    /// When set, the source fails with a malformed-stream error after this
    /// many records
    #[serde(default)]
    pub fail_after_records: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".into());
        }

        Ok(())
    }

    /// Console-only logging
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_min_records_per_batch() -> usize {
    1
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[export]
interval_start = "2025-01-01T00:00:00Z"
interval_end = "2025-01-01T01:00:00Z"
source_path = "events.arrow"
destination_path = "out.arrow"
"#;

    fn minimal() -> SluiceConfig {
        toml::from_str(MINIMAL).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = minimal();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.slicer.max_bytes, 8 * 1024 * 1024);
        assert_eq!(config.slicer.min_records_per_batch, 1);
        assert_eq!(config.queue.policy(), QueuePolicy::Unbounded);
        assert_eq!(config.drain.idle_timeout(), None);
        assert_eq!(config.fault_injection.fail_after_records, None);
        assert!(!config.logging.local_enabled);
        assert!(config.export.projection().is_none());
    }

    #[test]
    fn test_interval_must_be_ordered() {
        let mut config = minimal();
        config.export.interval_end = config.export.interval_start;
        let err = config.validate().unwrap_err();
        assert!(err.contains("must be before"));
    }

    #[test]
    fn test_destination_optional_for_dry_run() {
        let mut config = minimal();
        config.export.destination_path.clear();
        assert!(config.validate().is_err());

        config.export.dry_run = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_slicer_bounds_must_be_positive() {
        let mut config = minimal();
        config.slicer.max_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = minimal();
        config.slicer.min_records_per_batch = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_queue_capacity_policy() {
        let config = QueueConfig { capacity: 8 };
        assert_eq!(config.policy(), QueuePolicy::Bounded(8));
    }

    #[test]
    fn test_zero_idle_timeout_rejected() {
        let mut config = minimal();
        config.drain.idle_timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.drain.idle_timeout_seconds = Some(30);
        assert_eq!(config.drain.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_export_id() {
        let mut config = minimal();
        config.export.export_id = Some("not-a-uuid".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = minimal();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
