//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sluice.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point export.source_path at an Arrow IPC file");
                println!("  2. Set the export interval and destination_path");
                println!("  3. Validate configuration: sluice validate-config");
                println!("  4. Run export: sluice export");
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Sluice Configuration File

[application]
log_level = "info"

[export]
interval_start = "2025-01-01T00:00:00Z"
interval_end = "2025-01-02T00:00:00Z"
source_path = "data/events.arrow"
destination_path = "out/events.arrow"

[slicer]
max_bytes = 8388608
min_records_per_batch = 1

[queue]
capacity = 0

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Sluice Configuration File
#
# Values may reference environment variables with ${VAR_NAME}; every
# setting can also be overridden with SLUICE_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Export
# ============================================================================
[export]
# Export identifier (UUID). Leave unset to generate one per run.
# export_id = "5f0c3e4e-4c4b-4f54-9a55-0e3c8c1c2d11"

# Half-open data interval [interval_start, interval_end), RFC 3339
interval_start = "2025-01-01T00:00:00Z"
interval_end = "2025-01-02T00:00:00Z"

# Arrow IPC file to read from
# source_path = "${SLUICE_DATA_DIR}/events.arrow"
source_path = "data/events.arrow"

# Arrow IPC file to write to (not needed for dry runs)
destination_path = "out/events.arrow"

# Columns to export, in order. Empty exports every column.
fields = []

# Stream and slice everything but write nothing
dry_run = false

# ============================================================================
# Slicing
# ============================================================================
[slicer]
# Approximate byte budget for one slice
max_bytes = 8388608

# Every slice except the last reaches this many rows, even past max_bytes
min_records_per_batch = 1

# ============================================================================
# Relay Queue
# ============================================================================
[queue]
# Maximum slices in flight between producer and consumer. 0 = unbounded.
capacity = 0

# ============================================================================
# Consumer Drain
# ============================================================================
[drain]
# Fail the run when no slice arrives for this many seconds while the
# producer is still running. Unset waits indefinitely.
# idle_timeout_seconds = 300

# ============================================================================
# Fault Injection (testing only)
# ============================================================================
[fault_injection]
# Fail the source with a malformed-stream error after this many records
# fail_after_records = 1000

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON file logging in addition to the console
local_enabled = false
local_path = "./logs"

# Rotation: daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_are_valid() {
        let minimal = parse_config(&InitArgs::generate_minimal_config()).unwrap();
        assert_eq!(minimal.export.source_path, "data/events.arrow");

        let full = parse_config(&InitArgs::generate_config_with_examples()).unwrap();
        assert!(full.export.fields.is_empty());
        assert_eq!(full.drain.idle_timeout_seconds, None);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("sluice.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_writes_config() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("sluice.toml");

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[slicer]"));
    }
}
