//! Destination that discards everything (dry runs)

use super::traits::Destination;
use crate::domain::Result;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct NullDestination {
    rows_discarded: u64,
}

impl NullDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_discarded(&self) -> u64 {
        self.rows_discarded
    }
}

#[async_trait]
impl Destination for NullDestination {
    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.rows_discarded += batch.num_rows() as u64;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        tracing::info!(rows = self.rows_discarded, "Dry run, nothing written");
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
