//! Export command implementation
//!
//! This module implements the `export` command, which runs one export
//! attempt from the configured source to the configured destination.

use crate::adapters::factory::create_destination;
use crate::adapters::source::SourceQuery;
use crate::config::{load_config, SluiceConfig};
use crate::core::export::ExportCoordinator;
use crate::core::state::RunStatus;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dry run mode - stream and slice without writing the destination
    #[arg(long)]
    pub dry_run: bool,

    /// Inject a malformed-stream failure after this many records
    #[arg(long, value_name = "RECORDS")]
    pub fail_after: Option<u64>,

    /// Override slicer.max_bytes
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<usize>,

    /// Override slicer.min_records_per_batch
    #[arg(long, value_name = "RECORDS")]
    pub min_records: Option<usize>,

    /// Override the exported columns (comma-separated)
    #[arg(long)]
    pub fields: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    ///
    /// Exit codes: 0 completed, 2 configuration error, 3 cancelled,
    /// 5 export failed.
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        run_export(&config, shutdown_signal).await
    }

    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut SluiceConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }

        if let Some(records) = self.fail_after {
            tracing::info!(records, "Overriding fault injection from CLI");
            config.fault_injection.fail_after_records = Some(records);
        }

        if let Some(max_bytes) = self.max_bytes {
            tracing::info!(max_bytes, "Overriding slicer.max_bytes from CLI");
            config.slicer.max_bytes = max_bytes;
        }

        if let Some(min_records) = self.min_records {
            tracing::info!(min_records, "Overriding slicer.min_records_per_batch from CLI");
            config.slicer.min_records_per_batch = min_records;
        }

        if let Some(fields) = &self.fields {
            let fields: Vec<String> = fields
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::info!(fields = ?fields, "Overriding exported fields from CLI");
            config.export.fields = fields;
        }
    }
}

/// Run one export attempt for an already validated configuration
///
/// Returns the process exit code.
pub async fn run_export(
    config: &SluiceConfig,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    let export_id = config
        .export
        .resolve_export_id()
        .map_err(anyhow::Error::msg)?;
    let interval = config
        .export
        .data_interval()
        .map_err(anyhow::Error::msg)?;

    let mut query = SourceQuery::new(export_id, interval);
    if let Some(fields) = config.export.projection() {
        query = query.with_fields(fields);
    }

    let coordinator = ExportCoordinator::from_config(config, shutdown_signal)?;
    let mut destination = create_destination(config);

    if config.export.dry_run {
        println!("DRY RUN MODE - nothing will be written");
    }
    println!("Starting export {export_id}");

    let summary = match coordinator
        .execute_export(query, destination.as_mut())
        .await
    {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Export failed");
            eprintln!("Export failed: {e}");
            return Ok(5);
        }
    };

    println!();
    println!("Export Summary:");
    println!("  Run: {}", summary.run_id);
    println!("  Status: {}", summary.status);
    println!("  Batches Pulled: {}", summary.batches_pulled);
    println!("  Slices Written: {}", summary.slices_written);
    println!("  Records Written: {}", summary.records_written);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    Ok(match summary.status {
        RunStatus::Completed => 0,
        RunStatus::Cancelled => 3,
        _ => 5,
    })
}
