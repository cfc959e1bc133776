//! In-process run store

use super::traits::RunStore;
use crate::core::state::run::{ExportRun, ExportRunBuilder, RunStatus, RunUpdate};
use crate::domain::ids::{ExportId, RunId};
use crate::domain::interval::DataInterval;
use crate::domain::{RelayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Run store backed by a map; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<RunId, ExportRun>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs recorded so far
    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn create_run(
        &self,
        export_id: &ExportId,
        data_interval: &DataInterval,
        status: RunStatus,
    ) -> Result<RunId> {
        let run = ExportRunBuilder::new(*export_id, *data_interval)
            .status(status)
            .build();
        let run_id = run.id;

        tracing::debug!(
            run_id = %run_id,
            export_id = %export_id,
            status = %status,
            "Creating export run"
        );

        self.runs.write().await.insert(run_id, run);
        Ok(run_id)
    }

    async fn update_status(&self, run_id: &RunId, update: RunUpdate) -> Result<ExportRun> {
        let mut runs = self.runs.write().await;
        let run = runs
            .get_mut(run_id)
            .ok_or_else(|| RelayError::State(format!("Run not found: {run_id}")))?;

        run.apply(update).map_err(RelayError::State)?;
        Ok(run.clone())
    }

    async fn get_run(&self, run_id: &RunId) -> Result<Option<ExportRun>> {
        Ok(self.runs.read().await.get(run_id).cloned())
    }

    async fn list_runs(&self, export_id: &ExportId) -> Result<Vec<ExportRun>> {
        let mut runs: Vec<ExportRun> = self
            .runs
            .read()
            .await
            .values()
            .filter(|run| run.export_id == *export_id)
            .cloned()
            .collect();
        runs.sort_by_key(|run| run.created_at);
        Ok(runs)
    }
}
