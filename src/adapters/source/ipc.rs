//! Arrow IPC file source
//!
//! Reads record batches from an Arrow IPC file on local disk. Decode
//! failures surface as [`SourceError::MalformedStream`].

use super::traits::{BatchSource, BatchStream, SourceQuery};
use crate::domain::SourceError;
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type ReadStep = (Option<std::result::Result<RecordBatch, SourceError>>, ReadState);

/// Streams the batches stored in one Arrow IPC file
///
/// The file is opened on the first poll and every read runs on the
/// blocking pool, so the stream never stalls the async workers.
#[derive(Debug, Clone)]
pub struct IpcFileSource {
    path: Arc<Path>,
}

impl IpcFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::from(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

enum ReadState {
    Unopened,
    Open(FileReader<File>),
    Done,
}

fn open(path: &Path) -> std::result::Result<FileReader<File>, SourceError> {
    let file = File::open(path).map_err(|e| {
        SourceError::Unavailable(format!("Failed to open {}: {e}", path.display()))
    })?;
    FileReader::try_new(file, None).map_err(|e| {
        SourceError::MalformedStream(format!(
            "Failed to read Arrow IPC header from {}: {e}",
            path.display()
        ))
    })
}

/// Advance the reader by one batch, opening the file first if needed
fn read_next(path: &Path, state: ReadState) -> ReadStep {
    let mut reader = match state {
        ReadState::Done => return (None, ReadState::Done),
        ReadState::Open(reader) => reader,
        ReadState::Unopened => match open(path) {
            Ok(reader) => {
                tracing::debug!(
                    path = %path.display(),
                    batches = reader.num_batches(),
                    "Opened Arrow IPC source"
                );
                reader
            }
            Err(e) => return (Some(Err(e)), ReadState::Done),
        },
    };

    match reader.next() {
        Some(Ok(batch)) => (Some(Ok(batch)), ReadState::Open(reader)),
        Some(Err(e)) => (
            Some(Err(SourceError::MalformedStream(format!("Invalid batch: {e}")))),
            ReadState::Done,
        ),
        None => (None, ReadState::Done),
    }
}

impl BatchSource for IpcFileSource {
    fn stream_batches<'a>(&'a self, query: &'a SourceQuery) -> BatchStream<'a> {
        let path = self.path.clone();
        stream::unfold(ReadState::Unopened, move |state| {
            let path = path.clone();
            async move {
                if matches!(state, ReadState::Done) {
                    return None;
                }
                let step = tokio::task::spawn_blocking(move || read_next(&path, state)).await;
                match step {
                    Ok((item, next)) => item.map(|item| (item, next)),
                    Err(e) => Some((
                        Err(SourceError::Unavailable(format!("IPC read task failed: {e}"))),
                        ReadState::Done,
                    )),
                }
            }
        })
        .map(move |item| item.and_then(|batch| project(batch, query.fields.as_deref())))
        .boxed()
    }

    fn name(&self) -> &str {
        "arrow-ipc"
    }
}

fn project(
    batch: RecordBatch,
    fields: Option<&[String]>,
) -> std::result::Result<RecordBatch, SourceError> {
    let Some(fields) = fields else {
        return Ok(batch);
    };

    let schema = batch.schema();
    let indices = fields
        .iter()
        .map(|name| {
            schema.index_of(name).map_err(|_| {
                SourceError::MalformedStream(format!("Column '{name}' not present in stream"))
            })
        })
        .collect::<std::result::Result<Vec<usize>, SourceError>>()?;

    batch
        .project(&indices)
        .map_err(|e| SourceError::MalformedStream(format!("Projection failed: {e}")))
}
