//! Batch sources
//!
//! A source is anything that can stream Arrow record batches for a
//! [`SourceQuery`]. The real data-store client lives outside this crate;
//! [`MemorySource`] and [`IpcFileSource`] cover tests and local files.

pub mod ipc;
pub mod memory;
pub mod traits;

pub use ipc::IpcFileSource;
pub use memory::MemorySource;
pub use traits::{BatchSource, BatchStream, SourceQuery};
