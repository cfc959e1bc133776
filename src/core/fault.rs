//! Fault-injecting batch source
//!
//! Wraps another [`BatchSource`] and fails with
//! [`SourceError::MalformedStream`] once a configured number of records has
//! gone through. This reproduces the malformed-message failure seen from
//! real data stores mid-stream, so recovery paths can be exercised
//! deterministically.

use crate::adapters::source::{BatchSource, BatchStream, SourceQuery};
use crate::core::slicer::{slice_record_batch, RecordBatchSlices, SliceBounds};
use crate::domain::SourceError;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source decorator that injects a malformed-stream error
///
/// Every upstream batch is re-sliced into single-record batches so the
/// failure point does not depend on how the upstream happens to batch
/// rows. The record counter belongs to the wrapper and keeps counting
/// across every stream it opens.
///
/// # Examples
///
/// ```
/// use sluice::adapters::source::MemorySource;
/// use sluice::core::fault::FaultInjectingSource;
/// use std::sync::Arc;
///
/// let source = FaultInjectingSource::new(Arc::new(MemorySource::default()), 10);
/// assert_eq!(source.fail_after_records(), 10);
/// assert_eq!(source.records_yielded(), 0);
/// ```
pub struct FaultInjectingSource {
    inner: Arc<dyn BatchSource>,
    fail_after_records: u64,
    yielded: AtomicU64,
}

impl FaultInjectingSource {
    pub fn new(inner: Arc<dyn BatchSource>, fail_after_records: u64) -> Self {
        Self {
            inner,
            fail_after_records,
            yielded: AtomicU64::new(0),
        }
    }

    /// Records that may be yielded before the error is raised
    pub fn fail_after_records(&self) -> u64 {
        self.fail_after_records
    }

    /// Records yielded so far across all streams
    pub fn records_yielded(&self) -> u64 {
        self.yielded.load(Ordering::SeqCst)
    }

    /// Take the next record, or the injected error if the budget is spent
    fn admit(&self) -> std::result::Result<(), SourceError> {
        let limit = self.fail_after_records;
        match self
            .yielded
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < limit).then_some(n + 1))
        {
            Ok(_) => Ok(()),
            Err(yielded) => {
                tracing::warn!(
                    source = self.inner.name(),
                    fail_after_records = limit,
                    "Injecting malformed stream failure"
                );
                Err(SourceError::MalformedStream(format!(
                    "Simulated failure after {yielded} records"
                )))
            }
        }
    }
}

struct FaultState<'a> {
    upstream: BatchStream<'a>,
    pending: Option<RecordBatchSlices>,
    finished: bool,
}

impl BatchSource for FaultInjectingSource {
    fn stream_batches<'a>(&'a self, query: &'a SourceQuery) -> BatchStream<'a> {
        let state = FaultState {
            upstream: self.inner.stream_batches(query),
            pending: None,
            finished: false,
        };

        stream::unfold(state, move |mut state| async move {
            if state.finished {
                return None;
            }

            loop {
                if let Some(slice) = state.pending.as_mut().and_then(Iterator::next) {
                    return match self.admit() {
                        Ok(()) => Some((Ok(slice), state)),
                        Err(e) => {
                            state.finished = true;
                            Some((Err(e), state))
                        }
                    };
                }

                match state.upstream.next().await {
                    Some(Ok(batch)) => {
                        state.pending =
                            Some(slice_record_batch(batch, SliceBounds::single_record()));
                    }
                    Some(Err(e)) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                    None => return None,
                }
            }
        })
        .boxed()
    }

    fn name(&self) -> &str {
        "fault-injecting"
    }
}
