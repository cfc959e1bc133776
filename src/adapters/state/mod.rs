//! Run bookkeeping storage
//!
//! [`RunStore`] is the interface; [`InMemoryRunStore`] keeps runs for the
//! lifetime of the process.

pub mod memory;
pub mod traits;

pub use memory::InMemoryRunStore;
pub use traits::RunStore;
