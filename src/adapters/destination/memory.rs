//! Destination that keeps slices in memory

use super::traits::Destination;
use crate::domain::{RelayError, Result};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Collects every slice written to it
///
/// Clones share the same buffer, so a clone kept by the caller can inspect
/// what the pipeline wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    batches: Arc<Mutex<Vec<RecordBatch>>>,
    finished: Arc<Mutex<bool>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slices written so far, in write order
    pub fn batches(&self) -> Vec<RecordBatch> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.batches().iter().map(RecordBatch::num_rows).sum()
    }

    /// Whether `finish` has been called
    pub fn is_finished(&self) -> bool {
        self.finished.lock().map(|f| *f).unwrap_or(false)
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.batches
            .lock()
            .map_err(|_| RelayError::Destination("memory destination poisoned".to_string()))?
            .push(batch.clone());
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        let mut finished = self
            .finished
            .lock()
            .map_err(|_| RelayError::Destination("memory destination poisoned".to_string()))?;
        *finished = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
