//! Lazy range scans.

use std::collections::VecDeque;
use std::ops::Bound;
use std::sync::Arc;

use grove_common::types::{Key, Value};
use tracing::trace;

use super::range::{as_byte_bound, KeyRange};
use super::store::MemKvStore;

/// A key-value pair produced by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// The key.
    pub key: Key,
    /// The value.
    pub value: Value,
}

impl ScanEntry {
    /// Creates a new scan entry.
    pub fn new(key: Key, value: Value) -> Self {
        Self { key, value }
    }
}

/// Ascending scan over a key range, reading the store in batches.
///
/// A batch shorter than the batch size means the range is exhausted. Writes
/// made after a batch was read become visible to later batches only if they
/// sort after the last key already returned.
#[derive(Debug)]
pub struct RangeScan {
    store: Arc<MemKvStore>,
    range: KeyRange,
    resume: Bound<Key>,
    buffer: VecDeque<ScanEntry>,
    batch_size: usize,
    exhausted: bool,
    current: Option<ScanEntry>,
}

impl RangeScan {
    pub(crate) fn new(store: Arc<MemKvStore>, range: KeyRange, batch_size: usize) -> Self {
        let exhausted = range.is_empty();
        Self {
            store,
            resume: range.start.clone(),
            range,
            buffer: VecDeque::new(),
            batch_size: batch_size.max(1),
            exhausted,
            current: None,
        }
    }

    /// Moves to the next entry. Returns false once the range is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.buffer.is_empty() && !self.exhausted {
            self.fill();
        }
        self.current = self.buffer.pop_front();
        self.current.is_some()
    }

    /// Returns the entry the scan is positioned on.
    pub fn current(&self) -> Option<&ScanEntry> {
        self.current.as_ref()
    }

    /// Returns the range being scanned.
    pub fn range(&self) -> &KeyRange {
        &self.range
    }

    fn fill(&mut self) {
        let batch = self.store.read_batch(
            as_byte_bound(&self.resume),
            as_byte_bound(&self.range.end),
            self.batch_size,
        );

        if batch.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some((last, _)) = batch.last() {
            self.resume = Bound::Excluded(last.clone());
        }
        trace!(
            fetched = batch.len(),
            exhausted = self.exhausted,
            "range scan batch"
        );
        self.buffer
            .extend(batch.into_iter().map(|(key, value)| ScanEntry::new(key, value)));
    }
}

impl Iterator for RangeScan {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            self.current.clone()
        } else {
            None
        }
    }
}
