//! Domain types for Sluice.
//!
//! - **Identifiers** ([`ExportId`], [`RunId`])
//! - **Data interval** ([`DataInterval`]) covered by a run
//! - **Error types** ([`RelayError`], [`SourceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, RelayError>`]:
//!
//! ```rust
//! use sluice::core::slicer::SliceBounds;
//! use sluice::domain::{RelayError, Result};
//!
//! fn bounds(max_bytes: usize) -> Result<SliceBounds> {
//!     SliceBounds::new(max_bytes, 1)
//! }
//!
//! assert!(matches!(bounds(0), Err(RelayError::InvalidSliceBounds { .. })));
//! ```

pub mod errors;
pub mod ids;
pub mod interval;
pub mod result;

pub use errors::{RelayError, SourceError};
pub use ids::{ExportId, RunId};
pub use interval::DataInterval;
pub use result::Result;
