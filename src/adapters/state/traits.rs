//! Run store abstraction
//!
//! The persistence layer for run bookkeeping lives outside this crate;
//! this trait is the seam it plugs into.

use crate::core::state::run::{ExportRun, RunStatus, RunUpdate};
use crate::domain::ids::{ExportId, RunId};
use crate::domain::interval::DataInterval;
use crate::domain::Result;
use async_trait::async_trait;

/// Storage for run lifecycle records
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Create a new run record and return its id
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    async fn create_run(
        &self,
        export_id: &ExportId,
        data_interval: &DataInterval,
        status: RunStatus,
    ) -> Result<RunId>;

    /// Apply a status update to an existing run
    ///
    /// # Errors
    ///
    /// Returns an error if the run does not exist or the transition is not
    /// allowed from its current status.
    async fn update_status(&self, run_id: &RunId, update: RunUpdate) -> Result<ExportRun>;

    /// Load a run by id
    async fn get_run(&self, run_id: &RunId) -> Result<Option<ExportRun>>;

    /// All runs for an export, oldest first
    async fn list_runs(&self, export_id: &ExportId) -> Result<Vec<ExportRun>>;
}
