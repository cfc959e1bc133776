//! Destinations for exported slices

pub mod ipc;
pub mod memory;
pub mod null;
pub mod traits;

pub use ipc::IpcFileDestination;
pub use memory::MemoryDestination;
pub use null::NullDestination;
pub use traits::Destination;
