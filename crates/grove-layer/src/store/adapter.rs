//! The store contract the layer scans through.

use grove_common::constants::{GROUP_DATA_SUBSPACE, INDEX_DATA_SUBSPACE};
use grove_common::error::GroveResult;
use grove_common::types::{Key, Value as StoredValue};
use grove_storage::{strinc, RangeScan, ScanEntry};

use crate::hkey::HKey;
use crate::schema::Group;
use crate::tuple::{encode_element, Element};

/// A lazy ascending sequence of raw store entries.
pub trait RawScan: Send {
    /// Moves to the next entry; false once exhausted.
    fn next_raw_entry(&mut self) -> GroveResult<bool>;

    /// The entry the scan is positioned on.
    fn current(&self) -> Option<&ScanEntry>;
}

impl RawScan for RangeScan {
    fn next_raw_entry(&mut self) -> GroveResult<bool> {
        Ok(self.advance())
    }

    fn current(&self) -> Option<&ScanEntry> {
        RangeScan::current(self)
    }
}

/// Ordered key-value access used by group cursors.
pub trait StoreAdapter: Send + Sync {
    /// Scans `[lower, upper)`; a missing bound is open.
    fn raw_scan(&self, lower: Option<&[u8]>, upper: Option<&[u8]>) -> GroveResult<Box<dyn RawScan>>;

    /// Point read.
    fn get(&self, key: &[u8]) -> GroveResult<Option<StoredValue>>;

    /// Prefix shared by every row key of `group`.
    fn group_prefix(&self, group: &Group) -> GroveResult<Key> {
        group_prefix(group.id())
    }

    /// Key of the row at `hkey`, which is also the prefix of its
    /// descendants' keys.
    fn encode_hkey_prefix(&self, group: &Group, hkey: &HKey) -> GroveResult<Key> {
        let mut buf = self.group_prefix(group)?.as_bytes().to_vec();
        hkey.encode_into(&mut buf)?;
        Ok(Key::from_vec(buf))
    }

    /// Exclusive upper bound of the subtree under the row keyed `prefix`.
    ///
    /// Child segments open with an integer ordinal code, below `0xFF`, while
    /// a string or byte key that merely extends the anchor's bytes continues
    /// with the `0xFF` escape. `prefix ++ 0xFF` keeps the former and cuts the
    /// latter.
    fn subtree_upper_bound(&self, prefix: &[u8]) -> GroveResult<Key> {
        let mut buf = Vec::with_capacity(prefix.len() + 1);
        buf.extend_from_slice(prefix);
        buf.push(0xFF);
        Ok(Key::from_vec(buf))
    }

    /// Smallest key after every key starting with `key`.
    fn increment_key(&self, key: &[u8]) -> GroveResult<Key> {
        strinc(key)
    }
}

/// `0x10` followed by the packed group id.
pub fn group_prefix(group_id: u32) -> GroveResult<Key> {
    subspace_prefix(GROUP_DATA_SUBSPACE, group_id)
}

/// `0x11` followed by the packed index id.
pub fn index_prefix(index_id: u32) -> GroveResult<Key> {
    subspace_prefix(INDEX_DATA_SUBSPACE, index_id)
}

fn subspace_prefix(subspace: u8, id: u32) -> GroveResult<Key> {
    let mut buf = vec![subspace];
    encode_element(&mut buf, &Element::Integer(i64::from(id)))?;
    Ok(Key::from_vec(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(group_prefix(0).unwrap().as_bytes(), &[0x10, 0x14]);
        assert_eq!(group_prefix(5).unwrap().as_bytes(), &[0x10, 0x15, 0x05]);
        assert_eq!(index_prefix(300).unwrap().as_bytes(), &[0x11, 0x16, 0x01, 0x2C]);
    }

    struct NoStore;

    impl StoreAdapter for NoStore {
        fn raw_scan(&self, _: Option<&[u8]>, _: Option<&[u8]>) -> GroveResult<Box<dyn RawScan>> {
            Err(grove_common::GroveError::internal("unused"))
        }

        fn get(&self, _: &[u8]) -> GroveResult<Option<StoredValue>> {
            Ok(None)
        }
    }

    #[test]
    fn test_subtree_bound_excludes_escaped_extensions() {
        let mut anchor = vec![0x10, 0x15, 0x01, 0x15, 0x01];
        encode_element(&mut anchor, &Element::from("ab")).unwrap();
        let upper = NoStore.subtree_upper_bound(&anchor).unwrap();

        let mut sibling = vec![0x10, 0x15, 0x01, 0x15, 0x01];
        encode_element(&mut sibling, &Element::from("ab\0x")).unwrap();
        assert!(sibling.starts_with(&anchor));
        assert!(sibling.as_slice() >= upper.as_bytes());

        let mut child = anchor.clone();
        encode_element(&mut child, &Element::Integer(2)).unwrap();
        encode_element(&mut child, &Element::Integer(i64::MAX)).unwrap();
        assert!(child.as_slice() < upper.as_bytes());
    }
}
