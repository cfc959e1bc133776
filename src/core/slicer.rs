//! Record batch slicing
//!
//! Splits one arbitrarily large Arrow [`RecordBatch`] into an ordered,
//! lazily produced sequence of zero-copy slices. Each slice stays within a
//! byte budget unless that would leave it with fewer than the minimum
//! number of records; a single row is never split.

use crate::domain::{RelayError, Result};
use arrow::array::{Array, ArrayData, ArrayRef, AsArray, OffsetSizeTrait};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::iter::FusedIterator;

/// Size bounds for slicing
///
/// # Examples
///
/// ```
/// use sluice::core::slicer::SliceBounds;
///
/// let bounds = SliceBounds::new(8 * 1024 * 1024, 100).unwrap();
/// assert_eq!(bounds.min_records(), 100);
///
/// assert!(SliceBounds::new(0, 100).is_err());
/// assert!(SliceBounds::new(1024, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceBounds {
    max_bytes: usize,
    min_records: usize,
}

impl SliceBounds {
    /// Create slice bounds
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidSliceBounds`] if `max_bytes` is zero or
    /// `min_records` is below one.
    pub fn new(max_bytes: usize, min_records: usize) -> Result<Self> {
        if max_bytes == 0 || min_records == 0 {
            return Err(RelayError::InvalidSliceBounds {
                max_bytes,
                min_records,
            });
        }
        Ok(Self {
            max_bytes,
            min_records,
        })
    }

    /// Bounds that produce exactly one record per slice
    pub const fn single_record() -> Self {
        Self {
            max_bytes: 1,
            min_records: 1,
        }
    }

    /// Target upper bound on the estimated size of a slice
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Minimum rows per slice, except for the final remainder
    pub fn min_records(&self) -> usize {
        self.min_records
    }
}

/// Slice `batch` according to `bounds`
///
/// The returned iterator walks the batch row by row; nothing is
/// materialized up front. Concatenating its items reproduces `batch`.
pub fn slice_record_batch(batch: RecordBatch, bounds: SliceBounds) -> RecordBatchSlices {
    RecordBatchSlices::new(batch, bounds)
}

/// Iterator over the slices of one record batch
pub struct RecordBatchSlices {
    batch: RecordBatch,
    sizers: Vec<ColumnSizer>,
    bounds: SliceBounds,
    offset: usize,
}

impl RecordBatchSlices {
    fn new(batch: RecordBatch, bounds: SliceBounds) -> Self {
        let sizers = batch.columns().iter().map(ColumnSizer::for_array).collect();
        Self {
            batch,
            sizers,
            bounds,
            offset: 0,
        }
    }

    /// Rows of the parent batch not yet handed out
    pub fn remaining_rows(&self) -> usize {
        self.batch.num_rows() - self.offset
    }

    fn row_size(&self, row: usize) -> usize {
        self.sizers
            .iter()
            .map(|sizer| sizer.row_size(row))
            .sum::<usize>()
            .max(1)
    }
}

impl Iterator for RecordBatchSlices {
    type Item = RecordBatch;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.batch.num_rows();
        if self.offset >= total {
            return None;
        }

        let start = self.offset;
        let mut end = start;
        let mut bytes = 0usize;

        while end < total {
            let row_bytes = self.row_size(end);
            let rows = end - start;
            if rows >= self.bounds.min_records
                && bytes.saturating_add(row_bytes) > self.bounds.max_bytes
            {
                break;
            }
            bytes = bytes.saturating_add(row_bytes);
            end += 1;
        }

        self.offset = end;
        Some(self.batch.slice(start, end - start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining_rows();
        (usize::from(remaining > 0), Some(remaining))
    }
}

impl FusedIterator for RecordBatchSlices {}

/// Per-row byte estimate for one column
enum ColumnSizer {
    Fixed(usize),
    Offsets32(ArrayData),
    Offsets64(ArrayData),
    List(OffsetBuffer<i32>, Box<ColumnSizer>),
    LargeList(OffsetBuffer<i64>, Box<ColumnSizer>),
    Average(usize),
}

impl ColumnSizer {
    fn for_array(array: &ArrayRef) -> Self {
        match array.data_type() {
            DataType::Utf8 | DataType::Binary => Self::Offsets32(array.to_data()),
            DataType::LargeUtf8 | DataType::LargeBinary => Self::Offsets64(array.to_data()),
            DataType::Boolean => Self::Fixed(1),
            DataType::List(_) => {
                let list = array.as_list::<i32>();
                Self::List(list.offsets().clone(), Box::new(Self::for_array(list.values())))
            }
            DataType::LargeList(_) => {
                let list = array.as_list::<i64>();
                Self::LargeList(list.offsets().clone(), Box::new(Self::for_array(list.values())))
            }
            data_type => match data_type.primitive_width() {
                Some(width) => Self::Fixed(width),
                None => {
                    // Count only the bytes this array's rows reach, not the
                    // whole buffers of a parent it was sliced from
                    let bytes = array
                        .to_data()
                        .get_slice_memory_size()
                        .unwrap_or_else(|_| array.get_array_memory_size());
                    Self::Average(bytes.div_ceil(array.len().max(1)))
                }
            },
        }
    }

    fn row_size(&self, row: usize) -> usize {
        match self {
            Self::Fixed(width) => *width,
            Self::Offsets32(data) => {
                let offsets = data.buffer::<i32>(0);
                let span = (offsets[row + 1] - offsets[row]).max(0) as usize;
                span + std::mem::size_of::<i32>()
            }
            Self::Offsets64(data) => {
                let offsets = data.buffer::<i64>(0);
                let span = (offsets[row + 1] - offsets[row]).max(0) as usize;
                span + std::mem::size_of::<i64>()
            }
            Self::List(offsets, values) => list_row_size(offsets, values, row),
            Self::LargeList(offsets, values) => list_row_size(offsets, values, row),
            Self::Average(bytes) => *bytes,
        }
    }
}

fn list_row_size<O: OffsetSizeTrait>(
    offsets: &OffsetBuffer<O>,
    values: &ColumnSizer,
    row: usize,
) -> usize {
    let (start, end) = (offsets[row].as_usize(), offsets[row + 1].as_usize());
    (start..end).map(|i| values.row_size(i)).sum::<usize>() + std::mem::size_of::<O>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Int64Array, ListArray, StringArray};
    use arrow::compute::concat_batches;
    use arrow::datatypes::{Field, Int32Type, Schema};
    use std::sync::Arc;
    use test_case::test_case;

    fn int_batch(n: i64) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from_iter_values(0..n))]).unwrap()
    }

    fn mixed_batch(n: usize) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("event", DataType::Utf8, true),
            Field::new("flag", DataType::Boolean, true),
        ]));
        let ids: Vec<i64> = (0..n as i64).collect();
        let events: Vec<String> = (0..n)
            .map(|i| format!("event-{}", "x".repeat(i % 7)))
            .collect();
        let flags: Vec<bool> = (0..n).map(|i| i % 2 == 0).collect();
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(StringArray::from(events)),
                Arc::new(BooleanArray::from(flags)),
            ],
        )
        .unwrap()
    }

    fn row_counts(slices: &[RecordBatch]) -> Vec<usize> {
        slices.iter().map(RecordBatch::num_rows).collect()
    }

    #[test]
    fn test_single_record_bounds_yield_one_slice_per_row() {
        let slices: Vec<_> =
            slice_record_batch(int_batch(5), SliceBounds::new(1, 1).unwrap()).collect();
        assert_eq!(row_counts(&slices), vec![1, 1, 1, 1, 1]);

        let ids: Vec<i64> = slices
            .iter()
            .map(|s| {
                s.column(0)
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .unwrap()
                    .value(0)
            })
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    // Int64 rows are estimated at 8 bytes each.
    #[test_case(10, 24, 1, vec![3, 3, 3, 1] ; "byte bound closes slices")]
    #[test_case(10, 24, 4, vec![4, 4, 2] ; "record floor overrides byte bound")]
    #[test_case(10, 1_000_000, 1, vec![10] ; "large bound passes batch through")]
    #[test_case(10, 80, 1, vec![10] ; "exact fit stays in one slice")]
    #[test_case(10, 79, 1, vec![9, 1] ; "one byte short splits off last row")]
    #[test_case(3, 1, 5, vec![3] ; "short batch below floor is one remainder")]
    fn test_slice_row_counts(
        rows: i64,
        max_bytes: usize,
        min_records: usize,
        expected: Vec<usize>,
    ) {
        let bounds = SliceBounds::new(max_bytes, min_records).unwrap();
        let slices: Vec<_> = slice_record_batch(int_batch(rows), bounds).collect();
        assert_eq!(row_counts(&slices), expected);
    }

    #[test]
    fn test_variable_width_rows_use_offsets() {
        let schema = Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["a", "bb", "ccc"]))],
        )
        .unwrap();

        // Row sizes are 5, 6 and 7 bytes (payload plus one i32 offset).
        let slices: Vec<_> =
            slice_record_batch(batch, SliceBounds::new(11, 1).unwrap()).collect();
        assert_eq!(row_counts(&slices), vec![2, 1]);
    }

    #[test]
    fn test_slices_reassemble_parent() {
        let batch = mixed_batch(257);
        for (max_bytes, min_records) in [(1, 1), (64, 1), (64, 10), (512, 3), (1 << 20, 100)] {
            let bounds = SliceBounds::new(max_bytes, min_records).unwrap();
            let slices: Vec<_> = slice_record_batch(batch.clone(), bounds).collect();

            let total: usize = slices.iter().map(RecordBatch::num_rows).sum();
            assert_eq!(total, batch.num_rows());

            let rebuilt = concat_batches(&batch.schema(), &slices).unwrap();
            assert_eq!(rebuilt, batch);
        }
    }

    #[test]
    fn test_minimum_floor_holds_for_all_but_last() {
        let batch = mixed_batch(100);
        let bounds = SliceBounds::new(1, 7).unwrap();
        let slices: Vec<_> = slice_record_batch(batch, bounds).collect();

        let (last, rest) = slices.split_last().unwrap();
        assert!(rest.iter().all(|s| s.num_rows() >= 7));
        assert_eq!(last.num_rows(), 100 % 7);
    }

    #[test]
    fn test_empty_batch_yields_nothing() {
        let mut slices = slice_record_batch(int_batch(0), SliceBounds::new(10, 1).unwrap());
        assert!(slices.next().is_none());
        assert!(slices.next().is_none());
    }

    #[test]
    fn test_slicing_is_lazy() {
        let mut slices = slice_record_batch(int_batch(6), SliceBounds::new(16, 1).unwrap());
        assert_eq!(slices.remaining_rows(), 6);

        let first = slices.next().unwrap();
        assert_eq!(first.num_rows(), 2);
        assert_eq!(slices.remaining_rows(), 4);
    }

    #[test]
    fn test_sliced_input_sized_like_compact_copy() {
        let flags: Vec<bool> = (0..100_000).map(|i| i % 3 == 0).collect();
        let schema = Arc::new(Schema::new(vec![Field::new("flag", DataType::Boolean, false)]));
        let parent =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(BooleanArray::from(flags))])
                .unwrap();
        let window = parent.slice(500, 10);
        let compact = RecordBatch::try_new(
            schema,
            vec![Arc::new(BooleanArray::from(
                (500..510).map(|i| i % 3 == 0).collect::<Vec<_>>(),
            ))],
        )
        .unwrap();

        let bounds = SliceBounds::new(1000, 1).unwrap();
        let from_window: Vec<_> = slice_record_batch(window, bounds).collect();
        let from_compact: Vec<_> = slice_record_batch(compact, bounds).collect();
        assert_eq!(row_counts(&from_window), vec![10]);
        assert_eq!(row_counts(&from_window), row_counts(&from_compact));
    }

    #[test]
    fn test_sliced_list_column_uses_own_rows() {
        let values: Vec<Option<Vec<Option<i32>>>> = (0..50_000)
            .map(|i| Some(vec![Some(i), Some(i + 1)]))
            .collect();
        let list = ListArray::from_iter_primitive::<Int32Type, _, _>(values);
        let schema = Arc::new(Schema::new(vec![Field::new(
            "pair",
            list.data_type().clone(),
            true,
        )]));
        let parent = RecordBatch::try_new(schema, vec![Arc::new(list)]).unwrap();
        let window = parent.slice(1_000, 20);

        let slices: Vec<_> =
            slice_record_batch(window, SliceBounds::new(10_000, 1).unwrap()).collect();
        assert_eq!(row_counts(&slices), vec![20]);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(matches!(
            SliceBounds::new(0, 1),
            Err(RelayError::InvalidSliceBounds {
                max_bytes: 0,
                min_records: 1
            })
        ));
        assert!(SliceBounds::new(1, 0).is_err());
        assert_eq!(SliceBounds::single_record(), SliceBounds::new(1, 1).unwrap());
    }
}
