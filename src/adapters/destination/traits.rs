//! Destination abstraction

use crate::domain::Result;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

/// Sink for the slices drained from the relay queue
///
/// Slices arrive in queue order. `finish` is called once after the last
/// slice of a successful run and is not called when the run fails.
#[async_trait]
pub trait Destination: Send {
    /// Write one slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice cannot be written; the run is then
    /// marked failed.
    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;

    /// Flush anything buffered and close the destination
    async fn finish(&mut self) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
