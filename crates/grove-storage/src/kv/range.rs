//! Key ranges for scans.

use std::ops::Bound;

use grove_common::error::{GroveError, GroveResult};
use grove_common::types::Key;

/// Returns the first key that sorts after every key starting with `prefix`.
///
/// # Errors
///
/// Returns `InvalidArgument` when `prefix` is empty or consists only of
/// `0xFF` bytes, since no such key exists.
pub fn strinc(prefix: &[u8]) -> GroveResult<Key> {
    Key::from_bytes(prefix).strinc().ok_or_else(|| {
        GroveError::invalid_argument(format!(
            "key 0x{} has no successor prefix",
            hex::encode(prefix)
        ))
    })
}

/// Range bounds for scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Start bound.
    pub start: Bound<Key>,
    /// End bound.
    pub end: Bound<Key>,
}

impl KeyRange {
    /// Creates a range covering all keys.
    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Creates a range from start (inclusive) to end (exclusive).
    pub fn new(start: Key, end: Key) -> Self {
        Self {
            start: Bound::Included(start),
            end: Bound::Excluded(end),
        }
    }

    /// Creates a range from optional inclusive lower and exclusive upper keys.
    pub fn between(lower: Option<&[u8]>, upper: Option<&[u8]>) -> Self {
        Self {
            start: lower.map_or(Bound::Unbounded, |k| Bound::Included(Key::from_bytes(k))),
            end: upper.map_or(Bound::Unbounded, |k| Bound::Excluded(Key::from_bytes(k))),
        }
    }

    /// Creates a range holding exactly the keys that start with `prefix`.
    ///
    /// # Errors
    ///
    /// Fails like [`strinc`] when the prefix has no successor.
    pub fn prefix(prefix: &Key) -> GroveResult<Self> {
        let end = strinc(prefix.as_bytes())?;
        Ok(Self::new(prefix.clone(), end))
    }

    /// Checks if a key is within the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        let after_start = match &self.start {
            Bound::Included(start) => key >= start.as_bytes(),
            Bound::Excluded(start) => key > start.as_bytes(),
            Bound::Unbounded => true,
        };

        let before_end = match &self.end {
            Bound::Included(end) => key <= end.as_bytes(),
            Bound::Excluded(end) => key < end.as_bytes(),
            Bound::Unbounded => true,
        };

        after_start && before_end
    }

    /// Returns true if no key can fall inside the range.
    pub fn is_empty(&self) -> bool {
        bounds_empty(as_byte_bound(&self.start), as_byte_bound(&self.end))
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

pub(crate) fn as_byte_bound(bound: &Bound<Key>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_bytes()),
        Bound::Excluded(k) => Bound::Excluded(k.as_bytes()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// True when the bounds admit no key. Sorted-map range queries must not be
/// issued for such bounds.
pub(crate) fn bounds_empty(lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> bool {
    match (lower, upper) {
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strinc() {
        assert_eq!(strinc(b"abc").unwrap().as_bytes(), b"abd");
        assert_eq!(strinc(&[0x10, 0xFF]).unwrap().as_bytes(), &[0x11]);
    }

    #[test]
    fn test_strinc_rejects_no_successor() {
        let err = strinc(&[0xFF, 0xFF, 0xFF]).unwrap_err();
        assert_eq!(err.code(), grove_common::ErrorCode::InvalidArgument);
        assert!(strinc(&[]).is_err());
    }

    #[test]
    fn test_prefix_range() {
        let range = KeyRange::prefix(&Key::from_bytes(b"ab")).unwrap();
        assert!(range.contains(b"ab"));
        assert!(range.contains(b"ab\xff\xff"));
        assert!(!range.contains(b"ac"));
        assert!(!range.contains(b"a"));
    }

    #[test]
    fn test_between() {
        let range = KeyRange::between(Some(&b"b"[..]), None);
        assert!(range.contains(b"zzz"));
        assert!(!range.contains(b"a"));

        let range = KeyRange::between(None, Some(&b"b"[..]));
        assert!(range.contains(b""));
        assert!(!range.contains(b"b"));
        assert_eq!(KeyRange::between(None, None), KeyRange::all());
    }

    #[test]
    fn test_empty_ranges() {
        assert!(KeyRange::new(Key::from_bytes(b"b"), Key::from_bytes(b"a")).is_empty());
        assert!(KeyRange::new(Key::from_bytes(b"a"), Key::from_bytes(b"a")).is_empty());
        assert!(!KeyRange::new(Key::from_bytes(b"a"), Key::from_bytes(b"b")).is_empty());
        assert!(!KeyRange::all().is_empty());
    }
}
