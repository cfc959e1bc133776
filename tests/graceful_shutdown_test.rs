//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - A shutdown signal stops a running export
//! - The run record is marked CANCELLED with the rows delivered so far
//! - Rows written before the signal are intact and in order
//! - A shutdown signal sent before the export starts cancels immediately
//! - Dropping an in-flight export stops its producer and releases the source

use arrow::array::{Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};
use futures::stream::{self, StreamExt};
use sluice::adapters::destination::MemoryDestination;
use sluice::adapters::source::{BatchSource, BatchStream, MemorySource, SourceQuery};
use sluice::adapters::state::InMemoryRunStore;
use sluice::core::export::ExportCoordinator;
use sluice::core::slicer::SliceBounds;
use sluice::core::state::{RunManager, RunStatus};
use sluice::domain::{DataInterval, ExportId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn batch(range: std::ops::Range<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from_iter_values(range))]).unwrap()
}

fn query() -> SourceQuery {
    SourceQuery::new(
        ExportId::generate(),
        DataInterval::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(),
        )
        .unwrap(),
    )
}

/// Yields its batches, then stays open without producing more
struct OpenEndedSource {
    batches: Vec<RecordBatch>,
}

impl BatchSource for OpenEndedSource {
    fn stream_batches<'a>(&'a self, _query: &'a SourceQuery) -> BatchStream<'a> {
        stream::iter(self.batches.iter().cloned().map(Ok))
            .chain(stream::pending())
            .boxed()
    }

    fn name(&self) -> &str {
        "open-ended"
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Yields one batch, then stalls; records when its stream is dropped
struct GuardedSource {
    first: RecordBatch,
    dropped: Arc<AtomicBool>,
}

impl BatchSource for GuardedSource {
    fn stream_batches<'a>(&'a self, _query: &'a SourceQuery) -> BatchStream<'a> {
        let flag = DropFlag(self.dropped.clone());
        stream::once(async move { Ok(self.first.clone()) })
            .chain(stream::pending())
            .map(move |item| {
                let _ = &flag;
                item
            })
            .boxed()
    }

    fn name(&self) -> &str {
        "guarded"
    }
}

#[tokio::test]
async fn test_shutdown_cancels_running_export() {
    let source = Arc::new(OpenEndedSource {
        batches: vec![batch(0..10), batch(10..15)],
    });
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(
        source,
        RunManager::new(Arc::new(InMemoryRunStore::new())),
        shutdown_rx,
    )
    .with_slice_bounds(SliceBounds::new(1 << 20, 1).unwrap());
    let destination = MemoryDestination::new();
    let q = query();
    let export_id = q.export_id;

    let signal = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        shutdown_tx
    });

    let summary = coordinator
        .execute_export(q, &mut destination.clone())
        .await
        .unwrap();
    signal.await.unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert!(!summary.is_successful());
    assert_eq!(summary.records_written, 15);
    assert!(!destination.is_finished());

    let col = destination.batches();
    let ids: Vec<i64> = col
        .iter()
        .flat_map(|b| {
            let a = b.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
            (0..a.len()).map(|i| a.value(i)).collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(ids, (0..15).collect::<Vec<_>>());

    let runs = coordinator.runs().list_runs(&export_id).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Cancelled);
    assert_eq!(runs[0].records_completed, Some(15));
}

#[tokio::test]
async fn test_shutdown_before_start_cancels_immediately() {
    let source = Arc::new(MemorySource::new(vec![batch(0..100)]));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let coordinator = ExportCoordinator::new(
        source,
        RunManager::new(Arc::new(InMemoryRunStore::new())),
        shutdown_rx,
    );
    let destination = MemoryDestination::new();
    let q = query();
    let export_id = q.export_id;

    let summary = coordinator
        .execute_export(q, &mut destination.clone())
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert_eq!(destination.row_count(), 0);

    let runs = coordinator.runs().list_runs(&export_id).await.unwrap();
    assert_eq!(runs[0].status, RunStatus::Cancelled);
    drop(shutdown_tx);
}

#[tokio::test]
async fn test_completed_export_ignores_later_signal() {
    let source = Arc::new(MemorySource::new(vec![batch(0..20)]));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(
        source,
        RunManager::new(Arc::new(InMemoryRunStore::new())),
        shutdown_rx,
    );
    let destination = MemoryDestination::new();

    let summary = coordinator
        .execute_export(query(), &mut destination.clone())
        .await
        .unwrap();
    shutdown_tx.send(true).unwrap();

    assert_eq!(summary.status, RunStatus::Completed);
    assert!(summary.is_successful());
    assert!(destination.is_finished());

    let run = coordinator.runs().get_run(&summary.run_id).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.records_completed, Some(20));
}

#[tokio::test]
async fn test_dropped_export_stops_producer() {
    let dropped = Arc::new(AtomicBool::new(false));
    let source = Arc::new(GuardedSource {
        first: batch(0..4),
        dropped: dropped.clone(),
    });
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let coordinator = ExportCoordinator::new(
        source,
        RunManager::new(Arc::new(InMemoryRunStore::new())),
        shutdown_rx,
    );
    let mut destination = MemoryDestination::new();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        coordinator.execute_export(query(), &mut destination),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(destination.row_count(), 4);

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(dropped.load(Ordering::SeqCst));
}
