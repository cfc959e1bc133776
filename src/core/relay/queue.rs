//! Relay queue between the producer and consumer tasks
//!
//! A FIFO hand-off built on `tokio::sync::mpsc`. The producer enqueues
//! whole slices; the consumer only ever attempts non-blocking dequeues.
//! Nothing marking the end of the stream travels through the queue.

use crate::domain::{RelayError, Result};
use arrow::record_batch::RecordBatch;
use tokio::sync::mpsc;

/// Capacity policy of the relay queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// Producer never waits for the consumer
    #[default]
    Unbounded,
    /// Producer waits once this many slices are in flight
    Bounded(usize),
}

/// Create a relay queue with the given capacity policy
///
/// A bounded capacity of zero is treated as one.
pub fn relay_queue(policy: QueuePolicy) -> (RelaySender, RelayReceiver) {
    match policy {
        QueuePolicy::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                RelaySender {
                    inner: SenderKind::Unbounded(tx),
                },
                RelayReceiver {
                    inner: ReceiverKind::Unbounded(rx),
                },
            )
        }
        QueuePolicy::Bounded(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (
                RelaySender {
                    inner: SenderKind::Bounded(tx),
                },
                RelayReceiver {
                    inner: ReceiverKind::Bounded(rx),
                },
            )
        }
    }
}

enum SenderKind {
    Unbounded(mpsc::UnboundedSender<RecordBatch>),
    Bounded(mpsc::Sender<RecordBatch>),
}

enum ReceiverKind {
    Unbounded(mpsc::UnboundedReceiver<RecordBatch>),
    Bounded(mpsc::Receiver<RecordBatch>),
}

/// Producer end of the relay queue
pub struct RelaySender {
    inner: SenderKind,
}

impl RelaySender {
    /// Enqueue one slice, waiting for room if the queue is bounded
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::QueueClosed`] if the receiver was dropped or closed.
    pub async fn put(&self, batch: RecordBatch) -> Result<()> {
        let sent = match &self.inner {
            SenderKind::Unbounded(tx) => tx.send(batch).is_ok(),
            SenderKind::Bounded(tx) => tx.send(batch).await.is_ok(),
        };

        if sent {
            Ok(())
        } else {
            Err(RelayError::QueueClosed(
                "consumer closed the relay queue".to_string(),
            ))
        }
    }

    /// Whether the receiving end is gone
    pub fn is_closed(&self) -> bool {
        match &self.inner {
            SenderKind::Unbounded(tx) => tx.is_closed(),
            SenderKind::Bounded(tx) => tx.is_closed(),
        }
    }
}

/// Consumer end of the relay queue
pub struct RelayReceiver {
    inner: ReceiverKind,
}

impl RelayReceiver {
    /// Dequeue the next slice without waiting
    ///
    /// Returns `None` when the queue is currently empty.
    pub fn try_get(&mut self) -> Option<RecordBatch> {
        match &mut self.inner {
            ReceiverKind::Unbounded(rx) => rx.try_recv().ok(),
            ReceiverKind::Bounded(rx) => rx.try_recv().ok(),
        }
    }

    /// Stop accepting new slices; already queued slices can still be read
    pub fn close(&mut self) {
        match &mut self.inner {
            ReceiverKind::Unbounded(rx) => rx.close(),
            ReceiverKind::Bounded(rx) => rx.close(),
        }
    }
}
