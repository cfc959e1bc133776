// Sluice - Streaming batch export relay
// Copyright (c) 2025 Sluice Contributors
// Licensed under the MIT License

//! # Sluice - Streaming batch export relay
//!
//! Sluice streams Arrow record batches out of a source, splits them into
//! size-bounded slices and hands the slices from a producer task to a
//! consumer through an in-process queue.
//!
//! ## Overview
//!
//! This library provides:
//! - **Slicing** record batches by approximate byte size with a minimum row floor
//! - **Relaying** slices from a producer task to a consumer in FIFO order
//! - **Draining** the relay without blocking, ending once the producer is done
//! - **Tracking** each export attempt in a run lifecycle record
//! - **Injecting** deterministic source failures to exercise recovery paths
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline logic (slicer, relay, producer, coordinator, run state)
//! - [`adapters`] - Sources, destinations and run storage
//! - [`domain`] - Identifiers, intervals and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sluice::adapters::destination::MemoryDestination;
//! use sluice::adapters::source::{MemorySource, SourceQuery};
//! use sluice::adapters::state::InMemoryRunStore;
//! use sluice::core::export::ExportCoordinator;
//! use sluice::core::slicer::SliceBounds;
//! use sluice::core::state::RunManager;
//! use sluice::domain::{DataInterval, ExportId};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     batches: Vec<arrow::record_batch::RecordBatch>,
//! #     interval: DataInterval,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let runs = RunManager::new(Arc::new(InMemoryRunStore::new()));
//!
//! let source = Arc::new(MemorySource::new(batches));
//! let coordinator = ExportCoordinator::new(source, runs, shutdown_rx)
//!     .with_slice_bounds(SliceBounds::new(8 * 1024 * 1024, 100)?);
//!
//! let mut destination = MemoryDestination::new();
//! let query = SourceQuery::new(ExportId::generate(), interval);
//! let summary = coordinator.execute_export(query, &mut destination).await?;
//!
//! println!("Exported {} records", summary.records_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], whose error type is
//! [`domain::RelayError`]. Source failures arrive wrapped as
//! [`domain::RelayError::Source`] and are never swallowed.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
