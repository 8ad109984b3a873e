//! Fixed-size batch partitioning
//!
//! Batch membership depends only on the record order, the batch size and the
//! batch index, so a resumed run sees exactly the batches a fresh run would.

use crate::core::types::{ItemPosition, Record};

/// Contiguous slice of records with its zero-based index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a> {
    pub index: usize,
    /// Dataset row of the first record
    pub start_row: usize,
    pub records: &'a [Record],
}

impl<'a> Batch<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records paired with their positions, in input order
    pub fn items(&self) -> impl Iterator<Item = (ItemPosition, &'a Record)> + 'a {
        let batch_index = self.index;
        let start_row = self.start_row;
        self.records
            .iter()
            .enumerate()
            .map(move |(item_index, record)| {
                (
                    ItemPosition {
                        row_index: start_row + item_index,
                        batch_index,
                        item_index,
                    },
                    record,
                )
            })
    }
}

/// Number of batches needed for `total` records
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

/// Batch `index` of `records`
///
/// An index past the end, or a zero batch size, yields an empty batch.
pub fn batch_at(records: &[Record], batch_size: usize, index: usize) -> Batch<'_> {
    let start = index.saturating_mul(batch_size);
    if batch_size == 0 || start >= records.len() {
        return Batch {
            index,
            start_row: start.min(records.len()),
            records: &[],
        };
    }
    let end = start.saturating_add(batch_size).min(records.len());
    Batch {
        index,
        start_row: start,
        records: &records[start..end],
    }
}
