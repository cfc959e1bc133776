//! Batch source abstraction

use crate::domain::ids::ExportId;
use crate::domain::interval::DataInterval;
use crate::domain::SourceError;
use arrow::record_batch::RecordBatch;
use futures::stream::BoxStream;

/// Asynchronous, fallible sequence of record batches
pub type BatchStream<'a> = BoxStream<'a, std::result::Result<RecordBatch, SourceError>>;

/// Parameters a source needs to open a stream
#[derive(Debug, Clone, PartialEq)]
pub struct SourceQuery {
    /// Export the rows are fetched for
    pub export_id: ExportId,

    /// Interval of data to fetch
    pub data_interval: DataInterval,

    /// Columns to keep, in order; `None` keeps every column
    pub fields: Option<Vec<String>>,
}

impl SourceQuery {
    pub fn new(export_id: ExportId, data_interval: DataInterval) -> Self {
        Self {
            export_id,
            data_interval,
            fields: None,
        }
    }

    /// Restrict the stream to the named columns
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Anything that can stream record batches for a query
///
/// Streams are lazy: nothing is fetched until the first poll. A stream may
/// yield an error at any point, after which it should be treated as ended.
pub trait BatchSource: Send + Sync {
    /// Open a stream of batches for `query`
    fn stream_batches<'a>(&'a self, query: &'a SourceQuery) -> BatchStream<'a>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
