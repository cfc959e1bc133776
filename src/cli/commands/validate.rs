//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Sluice configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Interval: [{}, {})",
            config.export.interval_start.to_rfc3339(),
            config.export.interval_end.to_rfc3339()
        );
        println!("  Source: {}", config.export.source_path);
        if config.export.dry_run {
            println!("  Destination: (dry run)");
        } else {
            println!("  Destination: {}", config.export.destination_path);
        }
        if !config.export.fields.is_empty() {
            println!("  Fields: {}", config.export.fields.join(", "));
        }
        println!("  Max Slice Bytes: {}", config.slicer.max_bytes);
        println!(
            "  Min Records Per Slice: {}",
            config.slicer.min_records_per_batch
        );
        match config.queue.capacity {
            0 => println!("  Queue: unbounded"),
            n => println!("  Queue: bounded ({n})"),
        }
        if let Some(secs) = config.drain.idle_timeout_seconds {
            println!("  Drain Idle Timeout: {secs}s");
        }
        if let Some(n) = config.fault_injection.fail_after_records {
            println!("  Fault Injection: fail after {n} records");
        }

        Ok(0)
    }
}
