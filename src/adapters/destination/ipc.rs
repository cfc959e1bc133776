//! Arrow IPC file destination

use super::traits::Destination;
use crate::domain::{RelayError, Result};
use arrow::datatypes::SchemaRef;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes slices to a single Arrow IPC file
///
/// The file is created when the first slice arrives, using that slice's
/// schema. Later slices must carry the same schema. A run that writes
/// nothing leaves no file behind.
pub struct IpcFileDestination {
    path: PathBuf,
    schema: Option<SchemaRef>,
    writer: Option<FileWriter<BufWriter<File>>>,
    rows_written: u64,
}

impl IpcFileDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: None,
            writer: None,
            rows_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn writer_for(&mut self, batch: &RecordBatch) -> Result<&mut FileWriter<BufWriter<File>>> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(&self.path).map_err(|e| {
                RelayError::Destination(format!(
                    "Failed to create {}: {e}",
                    self.path.display()
                ))
            })?;
            let writer = FileWriter::try_new(BufWriter::new(file), &batch.schema())?;
            tracing::debug!(path = %self.path.display(), "Opened Arrow IPC destination");
            self.schema = Some(batch.schema());
            self.writer = Some(writer);
        } else if self.schema.as_ref() != Some(&batch.schema()) {
            return Err(RelayError::Destination(format!(
                "Slice schema does not match {}",
                self.path.display()
            )));
        }

        self.writer
            .as_mut()
            .ok_or_else(|| RelayError::Destination("IPC writer not initialized".to_string()))
    }
}

#[async_trait]
impl Destination for IpcFileDestination {
    async fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        let writer = self.writer_for(batch)?;
        writer
            .write(batch)
            .map_err(|e| RelayError::Destination(format!("Failed to write slice: {e}")))?;
        self.rows_written += batch.num_rows() as u64;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.finish()?;
                tracing::info!(
                    path = %self.path.display(),
                    rows = self.rows_written,
                    "Arrow IPC file written"
                );
            }
            None => {
                tracing::info!(
                    path = %self.path.display(),
                    "No rows exported, no file written"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "arrow-ipc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::ipc::reader::FileReader;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn batch(values: Vec<i32>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(values))]).unwrap()
    }

    #[tokio::test]
    async fn test_writes_readable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.arrow");
        let mut dest = IpcFileDestination::new(&path);

        dest.write_batch(&batch(vec![1, 2, 3])).await.unwrap();
        dest.write_batch(&batch(vec![4])).await.unwrap();
        dest.finish().await.unwrap();
        assert_eq!(dest.rows_written(), 4);

        let reader = FileReader::try_new(File::open(&path).unwrap(), None).unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 4);
    }

    #[tokio::test]
    async fn test_no_file_without_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.arrow");
        let mut dest = IpcFileDestination::new(&path);

        dest.finish().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_schema_change_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut dest = IpcFileDestination::new(dir.path().join("out.arrow"));
        dest.write_batch(&batch(vec![1])).await.unwrap();

        let other_schema = Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, false)]));
        let other =
            RecordBatch::try_new(other_schema, vec![Arc::new(StringArray::from(vec!["x"]))])
                .unwrap();

        let err = dest.write_batch(&other).await.unwrap_err();
        assert!(matches!(err, RelayError::Destination(_)));
    }
}
