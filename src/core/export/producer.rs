//! Producer task
//!
//! Registers a run attempt, then streams batches from a source, slices each
//! one and pushes the slices onto the relay queue from a spawned task.

use crate::adapters::source::{BatchSource, SourceQuery};
use crate::core::relay::{RelaySender, TaskState};
use crate::core::slicer::{slice_record_batch, SliceBounds};
use crate::core::state::RunManager;
use crate::domain::ids::RunId;
use crate::domain::{RelayError, Result};
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Counters reported by a finished producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Batches received from the source
    pub batches_pulled: u64,

    /// Slices placed on the relay queue
    pub slices_enqueued: u64,

    /// Records contained in the enqueued slices
    pub records_enqueued: u64,
}

/// Handle to a running producer task
///
/// Dropping the handle aborts the task, so a cancelled export never leaves
/// a producer holding the source stream.
pub struct ProducerHandle {
    run_id: RunId,
    task: Option<JoinHandle<Result<ProducerStats>>>,
}

impl ProducerHandle {
    /// Run record created for this attempt
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop the task at its next suspension point
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the task and return its outcome
    ///
    /// If this future is dropped before the task ends, the task is aborted.
    ///
    /// # Errors
    ///
    /// Returns the error the task ended with, [`RelayError::Cancelled`] if it
    /// was aborted, or [`RelayError::TaskFailed`] if it panicked.
    pub async fn join(mut self) -> Result<ProducerStats> {
        let Some(task) = self.task.as_mut() else {
            return Err(RelayError::TaskFailed(
                "Producer task already joined".to_string(),
            ));
        };
        let outcome = task.await;
        self.task = None;

        match outcome {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(RelayError::Cancelled),
            Err(e) => Err(RelayError::TaskFailed(format!("Producer task panicked: {e}"))),
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl TaskState for ProducerHandle {
    fn is_done(&self) -> bool {
        self.is_finished()
    }
}

/// Starts producer tasks
pub struct Producer {
    source: Arc<dyn BatchSource>,
    runs: RunManager,
    bounds: SliceBounds,
}

impl Producer {
    pub fn new(source: Arc<dyn BatchSource>, runs: RunManager, bounds: SliceBounds) -> Self {
        Self {
            source,
            runs,
            bounds,
        }
    }

    /// Create a `STARTING` run for `query` and spawn the producer task
    ///
    /// The run record exists before this returns. The task itself never
    /// changes the run status; that is left to whoever consumes the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the run record cannot be created, in which case
    /// no task is spawned.
    pub async fn start(&self, query: SourceQuery, sender: RelaySender) -> Result<ProducerHandle> {
        let run_id = self
            .runs
            .start_attempt(&query.export_id, &query.data_interval)
            .await?;

        let span = tracing::info_span!(
            "producer",
            run_id = %run_id,
            source = self.source.name()
        );
        let task = tokio::spawn(
            produce(self.source.clone(), query, self.bounds, sender).instrument(span),
        );

        Ok(ProducerHandle {
            run_id,
            task: Some(task),
        })
    }
}

async fn produce(
    source: Arc<dyn BatchSource>,
    query: SourceQuery,
    bounds: SliceBounds,
    sender: RelaySender,
) -> Result<ProducerStats> {
    let mut stats = ProducerStats::default();
    let mut batches = source.stream_batches(&query);

    while let Some(batch) = batches.next().await {
        let batch = batch.inspect_err(|e| {
            tracing::error!(
                error = %e,
                batches_pulled = stats.batches_pulled,
                records_enqueued = stats.records_enqueued,
                "Source stream failed"
            );
        })?;
        stats.batches_pulled += 1;

        for slice in slice_record_batch(batch, bounds) {
            let rows = slice.num_rows() as u64;
            sender.put(slice).await?;
            stats.slices_enqueued += 1;
            stats.records_enqueued += rows;
        }
    }

    tracing::debug!(
        batches_pulled = stats.batches_pulled,
        slices_enqueued = stats.slices_enqueued,
        records_enqueued = stats.records_enqueued,
        "Producer finished"
    );

    Ok(stats)
}
