//! Run manager
//!
//! Thin layer over a [`RunStore`] that names the lifecycle steps the
//! export pipeline performs and logs each of them.

use crate::adapters::state::RunStore;
use crate::core::state::run::{ExportRun, RunStatus, RunUpdate};
use crate::domain::ids::{ExportId, RunId};
use crate::domain::interval::DataInterval;
use crate::domain::Result;
use std::sync::Arc;

/// Lifecycle operations on export runs
#[derive(Clone)]
pub struct RunManager {
    store: Arc<dyn RunStore>,
}

impl RunManager {
    /// Create a new RunManager with a run store backend
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self { store }
    }

    /// Create the record for a new attempt with status `STARTING`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the record.
    pub async fn start_attempt(
        &self,
        export_id: &ExportId,
        data_interval: &DataInterval,
    ) -> Result<RunId> {
        let run_id = self
            .store
            .create_run(export_id, data_interval, RunStatus::Starting)
            .await?;

        tracing::info!(
            run_id = %run_id,
            export_id = %export_id,
            interval = %data_interval,
            "Created export run"
        );

        Ok(run_id)
    }

    pub async fn mark_running(&self, run_id: &RunId) -> Result<ExportRun> {
        self.store.update_status(run_id, RunUpdate::running()).await
    }

    pub async fn mark_completed(&self, run_id: &RunId, records: u64) -> Result<ExportRun> {
        tracing::info!(run_id = %run_id, records, "Export run completed");
        self.store
            .update_status(run_id, RunUpdate::completed(records))
            .await
    }

    pub async fn mark_failed(
        &self,
        run_id: &RunId,
        error: &str,
        records: u64,
    ) -> Result<ExportRun> {
        tracing::error!(run_id = %run_id, records, error = %error, "Export run failed");
        self.store
            .update_status(
                run_id,
                RunUpdate::failed(error).with_records_completed(records),
            )
            .await
    }

    pub async fn mark_cancelled(&self, run_id: &RunId, records: u64) -> Result<ExportRun> {
        tracing::warn!(run_id = %run_id, records, "Export run cancelled");
        self.store
            .update_status(
                run_id,
                RunUpdate::cancelled().with_records_completed(records),
            )
            .await
    }

    pub async fn get_run(&self, run_id: &RunId) -> Result<Option<ExportRun>> {
        self.store.get_run(run_id).await
    }

    pub async fn list_runs(&self, export_id: &ExportId) -> Result<Vec<ExportRun>> {
        self.store.list_runs(export_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::state::InMemoryRunStore;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_attempt_lifecycle() {
        let manager = RunManager::new(Arc::new(InMemoryRunStore::new()));
        let export_id = ExportId::generate();
        let interval = DataInterval::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap(),
        )
        .unwrap();

        let run_id = manager.start_attempt(&export_id, &interval).await.unwrap();
        let run = manager.get_run(&run_id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Starting);

        manager.mark_running(&run_id).await.unwrap();
        let run = manager.mark_completed(&run_id, 42).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.records_completed, Some(42));
    }
}
