//! Core pipeline logic for Sluice.
//!
//! # Modules
//!
//! - [`slicer`] - Splits record batches into size-bounded slices
//! - [`fault`] - Source decorator that injects a malformed-stream failure
//! - [`relay`] - Relay queue and the consumer drain protocol
//! - [`export`] - Producer task, coordinator and summary
//! - [`state`] - Run lifecycle records
//!
//! # Export Workflow
//!
//! 1. **Register**: The producer creates a `STARTING` run record
//! 2. **Stream**: Batches are pulled from the source in order
//! 3. **Slice**: Each batch is split by byte budget and minimum row count
//! 4. **Relay**: Slices go through the queue to the consumer
//! 5. **Write**: The consumer drains the queue into the destination
//! 6. **Finalize**: The run is marked `COMPLETED`, `FAILED` or `CANCELLED`
//!
//! # Example
//!
//! ```rust,no_run
//! use sluice::config::load_config;
//! use sluice::adapters::factory::create_destination;
//! use sluice::adapters::source::SourceQuery;
//! use sluice::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("sluice.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ExportCoordinator::from_config(&config, shutdown_rx)?;
//! let query = SourceQuery::new(
//!     config.export.resolve_export_id()?,
//!     config.export.data_interval()?,
//! );
//! let mut destination = create_destination(&config);
//!
//! let summary = coordinator.execute_export(query, destination.as_mut()).await?;
//! println!("Records: {}", summary.records_written);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod fault;
pub mod relay;
pub mod slicer;
pub mod state;
