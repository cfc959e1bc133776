//! Source over batches already held in memory

use super::traits::{BatchSource, BatchStream, SourceQuery};
use crate::domain::SourceError;
use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt};

/// Replays a fixed list of batches (and optionally errors) on every stream
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<std::result::Result<RecordBatch, SourceError>>,
    yield_between_batches: bool,
}

impl MemorySource {
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self {
            items: batches.into_iter().map(Ok).collect(),
            yield_between_batches: false,
        }
    }

    /// Replay batches and errors exactly as given
    pub fn from_results(items: Vec<std::result::Result<RecordBatch, SourceError>>) -> Self {
        Self {
            items,
            yield_between_batches: false,
        }
    }

    /// Suspend before every item, the way a network-backed source would
    pub fn with_yield_between_batches(mut self) -> Self {
        self.yield_between_batches = true;
        self
    }
}

impl BatchSource for MemorySource {
    fn stream_batches<'a>(&'a self, _query: &'a SourceQuery) -> BatchStream<'a> {
        let items = stream::iter(self.items.iter().cloned());
        if self.yield_between_batches {
            items
                .then(|item| async move {
                    tokio::task::yield_now().await;
                    item
                })
                .boxed()
        } else {
            items.boxed()
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataInterval, ExportId};
    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use chrono::{TimeZone, Utc};
    use futures::TryStreamExt;
    use std::sync::Arc;

    fn query() -> SourceQuery {
        SourceQuery::new(
            ExportId::generate(),
            DataInterval::new(
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap(),
            )
            .unwrap(),
        )
    }

    fn batch(values: Vec<i32>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(values))]).unwrap()
    }

    #[tokio::test]
    async fn test_replays_batches_in_order() {
        let source = MemorySource::new(vec![batch(vec![1, 2]), batch(vec![3])])
            .with_yield_between_batches();
        let q = query();

        let batches: Vec<RecordBatch> = source.stream_batches(&q).try_collect().await.unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].num_rows(), 2);
        assert_eq!(batches[1].num_rows(), 1);

        // A second stream starts from the beginning again.
        let again: Vec<RecordBatch> = source.stream_batches(&q).try_collect().await.unwrap();
        assert_eq!(again.len(), 2);
    }

    #[tokio::test]
    async fn test_replays_errors() {
        let source = MemorySource::from_results(vec![
            Ok(batch(vec![1])),
            Err(SourceError::MalformedStream("bad frame".to_string())),
        ]);
        let q = query();

        let result: std::result::Result<Vec<RecordBatch>, SourceError> =
            source.stream_batches(&q).try_collect().await;
        assert_eq!(
            result.unwrap_err(),
            SourceError::MalformedStream("bad frame".to_string())
        );
    }
}
