//! Export orchestration
//!
//! - [`producer`] - spawns the task that streams, slices and enqueues
//! - [`coordinator`] - drains the queue into a destination and finalizes the run
//! - [`summary`] - per-run reporting

pub mod coordinator;
pub mod producer;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use producer::{Producer, ProducerHandle, ProducerStats};
pub use summary::ExportSummary;
