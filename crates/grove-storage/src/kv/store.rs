//! The in-memory ordered store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use grove_common::constants::{DEFAULT_SCAN_BATCH_SIZE, MAX_KEY_SIZE, MAX_VALUE_SIZE};
use grove_common::error::{GroveError, GroveResult};
use grove_common::types::{Key, Value};
use parking_lot::RwLock;

use super::range::KeyRange;
use super::scan::RangeScan;

/// Ordered byte-key store held in memory.
///
/// Point operations take the map lock once. Range scans are lazy: each
/// batch re-acquires the read lock, so writers are never blocked for the
/// duration of a scan.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use grove_common::types::{Key, Value};
/// use grove_storage::{KeyRange, MemKvStore};
///
/// let store = Arc::new(MemKvStore::new());
/// store.put(Key::from_bytes(b"a"), Value::from_bytes(b"1")).unwrap();
/// store.put(Key::from_bytes(b"b"), Value::from_bytes(b"2")).unwrap();
///
/// let keys: Vec<_> = store.scan(KeyRange::all()).map(|e| e.key).collect();
/// assert_eq!(keys.len(), 2);
/// ```
#[derive(Debug)]
pub struct MemKvStore {
    entries: RwLock<BTreeMap<Key, Value>>,
    batch_size: usize,
    stats: StoreStats,
}

impl MemKvStore {
    /// Creates an empty store with the default scan batch size.
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_SCAN_BATCH_SIZE)
    }

    /// Creates an empty store whose scans read `batch_size` entries at a time.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            batch_size: batch_size.max(1),
            stats: StoreStats::default(),
        }
    }

    /// Writes a key, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns `KeyTooLarge` or `ValueTooLarge` when a size limit is exceeded.
    pub fn put(&self, key: Key, value: Value) -> GroveResult<Option<Value>> {
        if key.len() > MAX_KEY_SIZE {
            return Err(GroveError::KeyTooLarge {
                size: key.len(),
                max_size: MAX_KEY_SIZE,
            });
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(GroveError::ValueTooLarge {
                size: value.len(),
                max_size: MAX_VALUE_SIZE,
            });
        }

        self.stats.puts.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.write().insert(key, value))
    }

    /// Reads a key.
    pub fn get(&self, key: &[u8]) -> Option<Value> {
        self.stats.gets.fetch_add(1, Ordering::Relaxed);
        self.entries.read().get(key).cloned()
    }

    /// Deletes a key, returning the removed value.
    pub fn delete(&self, key: &[u8]) -> Option<Value> {
        self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        self.entries.write().remove(key)
    }

    /// Deletes every key in the range and returns how many were removed.
    pub fn delete_range(&self, range: &KeyRange) -> usize {
        if range.is_empty() {
            return 0;
        }
        let mut entries = self.entries.write();
        let doomed: Vec<Key> = entries
            .range::<[u8], _>((
                super::range::as_byte_bound(&range.start),
                super::range::as_byte_bound(&range.end),
            ))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            entries.remove(key.as_bytes());
        }
        self.stats
            .deletes
            .fetch_add(doomed.len() as u64, Ordering::Relaxed);
        doomed.len()
    }

    /// Starts a lazy ascending scan over `range`.
    pub fn scan(self: &Arc<Self>, range: KeyRange) -> RangeScan {
        RangeScan::new(Arc::clone(self), range, self.batch_size)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the scan batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns operation counters.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Copies out up to `limit` entries within the bounds. Used by scans.
    pub(crate) fn read_batch(
        &self,
        lower: std::ops::Bound<&[u8]>,
        upper: std::ops::Bound<&[u8]>,
        limit: usize,
    ) -> Vec<(Key, Value)> {
        self.stats.scan_batches.fetch_add(1, Ordering::Relaxed);
        if super::range::bounds_empty(lower, upper) {
            return Vec::new();
        }
        self.entries
            .read()
            .range::<[u8], _>((lower, upper))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for MemKvStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store operation counters.
#[derive(Debug, Default)]
pub struct StoreStats {
    gets: AtomicU64,
    puts: AtomicU64,
    deletes: AtomicU64,
    scan_batches: AtomicU64,
}

impl StoreStats {
    /// Point reads served.
    pub fn gets(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    /// Writes applied.
    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Deletes applied.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Batches read by range scans.
    pub fn scan_batches(&self) -> u64 {
        self.scan_batches.load(Ordering::Relaxed)
    }
}
