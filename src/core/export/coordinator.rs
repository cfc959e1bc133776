//! Export coordinator - main orchestrator for one export attempt
//!
//! Starts the producer, drains the relay queue into a destination and owns
//! every run status change after `STARTING`.

use crate::adapters::destination::Destination;
use crate::adapters::factory::create_source;
use crate::adapters::source::{BatchSource, SourceQuery};
use crate::adapters::state::InMemoryRunStore;
use crate::config::SluiceConfig;
use crate::core::export::producer::{Producer, ProducerHandle};
use crate::core::export::summary::ExportSummary;
use crate::core::relay::{relay_queue, QueuePolicy, RelayDrain};
use crate::core::slicer::SliceBounds;
use crate::core::state::{RunManager, RunStatus};
use crate::domain::ids::RunId;
use crate::domain::{RelayError, Result};
use crate::{log_error_with_context, log_export_complete, log_export_start};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Counters kept by the consumer side
#[derive(Debug, Default)]
struct Progress {
    slices: u64,
    records: u64,
}

/// Export coordinator
pub struct ExportCoordinator {
    source: Arc<dyn BatchSource>,
    runs: RunManager,
    bounds: SliceBounds,
    queue_policy: QueuePolicy,
    idle_timeout: Option<Duration>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator with default slicing and an unbounded queue
    pub fn new(
        source: Arc<dyn BatchSource>,
        runs: RunManager,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            runs,
            bounds: SliceBounds::single_record(),
            queue_policy: QueuePolicy::Unbounded,
            idle_timeout: None,
            shutdown_signal,
        }
    }

    /// Create a coordinator from configuration, with an in-memory run store
    ///
    /// # Errors
    ///
    /// Returns an error if the slicer bounds are invalid.
    pub fn from_config(
        config: &SluiceConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let runs = RunManager::new(Arc::new(InMemoryRunStore::new()));
        Ok(Self::new(create_source(config), runs, shutdown_signal)
            .with_slice_bounds(config.slicer.bounds()?)
            .with_queue_policy(config.queue.policy())
            .with_idle_timeout(config.drain.idle_timeout()))
    }

    pub fn with_slice_bounds(mut self, bounds: SliceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_queue_policy(mut self, policy: QueuePolicy) -> Self {
        self.queue_policy = policy;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Run manager holding the run records of this coordinator
    pub fn runs(&self) -> &RunManager {
        &self.runs
    }

    /// Execute one export attempt
    ///
    /// On success the run is marked `COMPLETED` and the destination is
    /// finished. A shutdown signal aborts the producer, marks the run
    /// `CANCELLED` and returns a summary with that status.
    ///
    /// # Errors
    ///
    /// Any source, queue, drain or destination error marks the run `FAILED`
    /// with the error message and is then returned unchanged. Errors
    /// creating the run record are returned before anything is streamed.
    pub async fn execute_export(
        &self,
        query: SourceQuery,
        destination: &mut dyn Destination,
    ) -> Result<ExportSummary> {
        let started = Instant::now();
        let export_id = query.export_id;

        let (sender, receiver) = relay_queue(self.queue_policy);
        let producer = Producer::new(self.source.clone(), self.runs.clone(), self.bounds)
            .start(query, sender)
            .await?;
        let run_id = producer.run_id();

        log_export_start!(&run_id, &export_id);
        if let Err(e) = self.runs.mark_running(&run_id).await {
            producer.abort();
            return Err(e);
        }
        tracing::debug!(
            run_id = %run_id,
            destination = destination.name(),
            max_bytes = self.bounds.max_bytes(),
            min_records = self.bounds.min_records(),
            "Relay configured"
        );

        let mut progress = Progress::default();
        let outcome = self
            .relay(&producer, RelayDrain::new(receiver), destination, &mut progress)
            .await;

        let mut summary = ExportSummary::new(run_id, export_id);
        summary.slices_written = progress.slices;
        summary.records_written = progress.records;

        let outcome = match outcome {
            Ok(()) => producer.join().await.map(|stats| {
                summary.batches_pulled = stats.batches_pulled;
            }),
            Err(e) => {
                producer.abort();
                Err(e)
            }
        };
        let outcome = match outcome {
            Ok(()) => destination.finish().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                self.runs.mark_completed(&run_id, progress.records).await?;
                summary.status = RunStatus::Completed;
                log_export_complete!(progress.records, started.elapsed());
            }
            Err(RelayError::Cancelled) => {
                self.runs.mark_cancelled(&run_id, progress.records).await?;
                summary.status = RunStatus::Cancelled;
                summary.error = Some(RelayError::Cancelled.to_string());
            }
            Err(e) => {
                log_error_with_context!(&e, "Export run failed");
                self.record_failure(&run_id, &e, progress.records).await;
                return Err(e);
            }
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Move slices from the queue to the destination until the producer is
    /// done and the queue is empty
    async fn relay(
        &self,
        producer: &ProducerHandle,
        drain: RelayDrain,
        destination: &mut dyn Destination,
        progress: &mut Progress,
    ) -> Result<()> {
        let mut drain = drain.with_idle_timeout(self.idle_timeout);
        let mut shutdown = self.shutdown_signal.clone();

        loop {
            let next = tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => {
                    tracing::warn!(
                        run_id = %producer.run_id(),
                        "Shutdown requested, cancelling export"
                    );
                    return Err(RelayError::Cancelled);
                }
                next = drain.next_batch(producer) => next?,
            };

            let Some(slice) = next else {
                return Ok(());
            };

            destination.write_batch(&slice).await?;
            progress.slices += 1;
            progress.records += slice.num_rows() as u64;
        }
    }

    async fn record_failure(&self, run_id: &RunId, error: &RelayError, records: u64) {
        if let Err(state_err) = self
            .runs
            .mark_failed(run_id, &error.to_string(), records)
            .await
        {
            log_error_with_context!(&state_err, "Failed to mark run as failed");
        }
    }
}

/// Resolves once the shutdown flag is set; never resolves if the sender is
/// gone without having set it
async fn shutdown_requested(signal: &mut watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
