//! Consumer drain protocol
//!
//! The consumer never blocks on the queue. Each call to
//! [`RelayDrain::next_batch`] polls with non-blocking dequeues, yielding to
//! the scheduler between attempts, until it either gets a slice or sees the
//! producer task finished with nothing left to read.

use super::queue::RelayReceiver;
use crate::domain::{RelayError, Result};
use arrow::record_batch::RecordBatch;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Completion probe for the task feeding a relay queue
pub trait TaskState {
    /// Whether the task has run to completion (successfully or not)
    fn is_done(&self) -> bool;
}

impl<T> TaskState for JoinHandle<T> {
    fn is_done(&self) -> bool {
        self.is_finished()
    }
}

impl<S: TaskState + ?Sized> TaskState for &S {
    fn is_done(&self) -> bool {
        (**self).is_done()
    }
}

/// Consumer side of the relay
pub struct RelayDrain {
    receiver: RelayReceiver,
    idle_timeout: Option<Duration>,
    delivered: u64,
}

impl RelayDrain {
    pub fn new(receiver: RelayReceiver) -> Self {
        Self {
            receiver,
            idle_timeout: None,
            delivered: 0,
        }
    }

    /// Give up waiting once no slice has arrived for `timeout`
    ///
    /// `None` waits as long as the producer is alive.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Slices handed out so far
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Fetch the next slice, or `None` once the producer is done and the
    /// queue is empty
    ///
    /// The producer's completion is checked only after a dequeue attempt
    /// came back empty, and one more dequeue is made after seeing it done,
    /// so a slice enqueued right before the producer finished is never
    /// lost. Calling this again after `None` keeps returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DrainTimeout`] if an idle timeout is set and
    /// it elapses while the producer is still running. The queue is closed
    /// first, so the producer's next enqueue fails instead of piling up.
    pub async fn next_batch<P>(&mut self, producer: &P) -> Result<Option<RecordBatch>>
    where
        P: TaskState + ?Sized,
    {
        let waiting_since = Instant::now();

        loop {
            if let Some(batch) = self.receiver.try_get() {
                return Ok(Some(self.deliver(batch)));
            }

            if producer.is_done() {
                return Ok(self.receiver.try_get().map(|batch| self.deliver(batch)));
            }

            if let Some(timeout) = self.idle_timeout {
                if waiting_since.elapsed() >= timeout {
                    tracing::warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        delivered = self.delivered,
                        "Relay drain timed out waiting for producer"
                    );
                    self.receiver.close();
                    return Err(RelayError::DrainTimeout {
                        waited_ms: timeout.as_millis(),
                    });
                }
            }

            tokio::task::yield_now().await;
        }
    }

    fn deliver(&mut self, batch: RecordBatch) -> RecordBatch {
        self.delivered += 1;
        tracing::trace!(
            rows = batch.num_rows(),
            delivered = self.delivered,
            "Drained slice"
        );
        batch
    }
}
