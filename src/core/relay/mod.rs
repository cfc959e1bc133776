//! Producer-to-consumer relay
//!
//! - [`queue`] - FIFO hand-off of record batch slices
//! - [`drain`] - the consumer's non-blocking drain protocol

pub mod drain;
pub mod queue;

pub use drain::{RelayDrain, TaskState};
pub use queue::{relay_queue, QueuePolicy, RelayReceiver, RelaySender};
