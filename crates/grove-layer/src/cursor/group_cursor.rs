//! Cursor over the rows of a group in clustered order.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use grove_common::error::{GroveError, GroveResult};

use crate::codec::TupleRowCodec;
use crate::hkey::HKey;
use crate::row::Row;
use crate::schema::Group;
use crate::store::StoreAdapter;

use super::scan::GroupScan;
use super::stats::ScanStats;

/// Lifecycle state of a [`GroupCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Not open; `next` is a contract violation.
    Closed,
    /// Open with nothing left to return.
    Idle,
    /// Open and positioned on a row.
    Active,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorState::Closed => write!(f, "closed"),
            CursorState::Idle => write!(f, "idle"),
            CursorState::Active => write!(f, "active"),
        }
    }
}

/// Scans a group: all of it, the subtree under an hkey, or the single row
/// at an hkey.
///
/// ```text
/// Closed --open--> Active --next...--> Idle --close--> Closed
///            \--(no rows)--> Idle --rebind/open--> ...
/// ```
pub struct GroupCursor {
    adapter: Arc<dyn StoreAdapter>,
    group: Arc<Group>,
    codec: TupleRowCodec,
    stats: Arc<ScanStats>,
    hkey: Option<HKey>,
    deep: bool,
    state: CursorState,
    scan: Option<GroupScan>,
    // The first entry is read by `open` and handed out by the next `next`.
    pending: bool,
}

impl GroupCursor {
    /// Creates a closed cursor over the whole group.
    pub fn new(adapter: Arc<dyn StoreAdapter>, group: Arc<Group>) -> Self {
        Self::with_stats(adapter, group, Arc::new(ScanStats::new()))
    }

    /// Creates a closed cursor that counts into shared `stats`.
    pub fn with_stats(adapter: Arc<dyn StoreAdapter>, group: Arc<Group>, stats: Arc<ScanStats>) -> Self {
        Self {
            adapter,
            group,
            codec: TupleRowCodec::new(),
            stats,
            hkey: None,
            deep: true,
            state: CursorState::Closed,
            scan: None,
            pending: false,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Returns the scan counters.
    pub fn stats(&self) -> &Arc<ScanStats> {
        &self.stats
    }

    /// Returns the group being scanned.
    pub fn group(&self) -> &Arc<Group> {
        &self.group
    }

    /// Points the next `open` at `hkey`, or at the whole group for `None`.
    /// With `deep` the scan includes the row's descendants.
    ///
    /// # Errors
    ///
    /// Returns `CursorState` while the cursor is mid-scan.
    pub fn rebind(&mut self, hkey: Option<HKey>, deep: bool) -> GroveResult<()> {
        if self.state == CursorState::Active {
            return Err(self.state_error("rebind"));
        }
        self.hkey = hkey;
        self.deep = deep;
        Ok(())
    }

    /// Starts a scan and positions on its first row.
    ///
    /// # Errors
    ///
    /// Returns `CursorState` while the cursor is mid-scan, or any store or
    /// key encoding error.
    pub fn open(&mut self) -> GroveResult<()> {
        if self.state == CursorState::Active {
            return Err(self.state_error("open"));
        }

        let mut scan = match &self.hkey {
            None => {
                let lower = self.adapter.group_prefix(&self.group)?;
                let upper = self.adapter.increment_key(lower.as_bytes())?;
                GroupScan::Full(
                    self.adapter
                        .raw_scan(Some(lower.as_bytes()), Some(upper.as_bytes()))?,
                )
            }
            Some(hkey) if self.deep => {
                let lower = self.adapter.encode_hkey_prefix(&self.group, hkey)?;
                let upper = self.adapter.subtree_upper_bound(lower.as_bytes())?;
                GroupScan::WithDescendants(
                    self.adapter
                        .raw_scan(Some(lower.as_bytes()), Some(upper.as_bytes()))?,
                )
            }
            Some(hkey) => GroupScan::WithoutDescendants {
                adapter: Arc::clone(&self.adapter),
                key: self.adapter.encode_hkey_prefix(&self.group, hkey)?,
                value: None,
                advanced: false,
            },
        };

        self.stats.record_open();
        let found = scan.advance(&self.stats)?;
        debug!(
            group = self.group.name(),
            strategy = scan.name(),
            found,
            "group cursor open"
        );
        self.scan = Some(scan);
        self.pending = found;
        self.state = if found {
            CursorState::Active
        } else {
            CursorState::Idle
        };
        Ok(())
    }

    /// Returns the next row, or `None` once the scan is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `CursorState` on a closed cursor, `Corruption` for keys that
    /// are not rows of the group, and decoding errors for bad values.
    pub fn next(&mut self) -> GroveResult<Option<Row>> {
        match self.state {
            CursorState::Closed => return Err(self.state_error("next")),
            CursorState::Idle => return Ok(None),
            CursorState::Active => {}
        }
        let Some(scan) = self.scan.as_mut() else {
            return Err(GroveError::internal("active cursor without a scan"));
        };

        if self.pending {
            self.pending = false;
        } else if !scan.advance(&self.stats)? {
            self.state = CursorState::Idle;
            self.scan = None;
            return Ok(None);
        }

        let (key, value) = scan
            .current()
            .ok_or_else(|| GroveError::internal("scan advanced without an entry"))?;
        let row = decode_row(&self.group, &self.codec, self.adapter.as_ref(), key, value)?;
        self.stats.record_row();
        Ok(Some(row))
    }

    /// Reads every remaining row.
    pub fn drain(&mut self) -> GroveResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Releases the scan. Closing a closed cursor does nothing.
    pub fn close(&mut self) {
        if self.state == CursorState::Closed {
            return;
        }
        self.scan = None;
        self.pending = false;
        self.state = CursorState::Closed;
        debug!(group = self.group.name(), "group cursor closed");
    }

    fn state_error(&self, operation: &'static str) -> GroveError {
        GroveError::CursorState {
            operation,
            state: self.state.to_string(),
        }
    }
}

fn decode_row(
    group: &Group,
    codec: &TupleRowCodec,
    adapter: &dyn StoreAdapter,
    key: &[u8],
    value: &[u8],
) -> GroveResult<Row> {
    let prefix = adapter.group_prefix(group)?;
    let hkey_bytes = key.strip_prefix(prefix.as_bytes()).ok_or_else(|| {
        GroveError::corruption(format!(
            "key 0x{} is outside group '{}'",
            hex::encode(key),
            group.name()
        ))
    })?;
    let hkey = HKey::decode(group, hkey_bytes)?;
    let table = hkey
        .table()
        .and_then(|id| group.table(id))
        .ok_or_else(|| GroveError::corruption("empty hkey"))?;
    let mut row = codec.decode_bytes(value, &table.row_type())?;
    trace!(%hkey, "group cursor row");
    row.set_hkey(hkey);
    Ok(row)
}

impl fmt::Debug for GroupCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupCursor")
            .field("group", &self.group.name())
            .field("state", &self.state)
            .field("hkey", &self.hkey)
            .field("deep", &self.deep)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;
    use crate::schema::{DataType, GroupBuilder, JoinDef, TableDef, TableId};
    use crate::store::GroupStore;
    use grove_common::ErrorCode;
    use grove_storage::MemKvStore;

    fn setup() -> (Arc<GroupStore>, Arc<Group>) {
        let group = Arc::new(
            GroupBuilder::new(1, "co")
                .root(
                    TableDef::new("s", "customers")
                        .column("cid", DataType::BigInt)
                        .primary_key(&["cid"]),
                )
                .child(
                    "customers",
                    TableDef::new("s", "orders")
                        .column("oid", DataType::BigInt)
                        .column("cid", DataType::BigInt)
                        .primary_key(&["oid"]),
                    JoinDef::on(&["cid"]),
                )
                .build()
                .unwrap(),
        );
        let store = Arc::new(GroupStore::new(Arc::new(MemKvStore::with_batch_size(2))));
        let customers = group.root().row_type();
        let orders = group.table_by_name("orders").unwrap().row_type();
        for cid in 1..=3 {
            store
                .write_row(&group, Row::new(Arc::clone(&customers), vec![Value::BigInt(cid)]))
                .unwrap();
            for oid in 0..2 {
                let oid = cid * 10 + oid;
                store
                    .write_row(
                        &group,
                        Row::new(Arc::clone(&orders), vec![Value::BigInt(oid), Value::BigInt(cid)]),
                    )
                    .unwrap();
            }
        }
        (store, group)
    }

    fn tables(rows: &[Row]) -> Vec<u32> {
        rows.iter().map(|r| r.row_type().table_id().ordinal()).collect()
    }

    #[test]
    fn test_next_before_open() {
        let (store, group) = setup();
        let mut cursor = GroupCursor::new(store, group);
        let err = cursor.next().unwrap_err();
        assert_eq!(err.code(), ErrorCode::CursorState);
        assert!(err.is_contract_violation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_full_scan() {
        let (store, group) = setup();
        let mut cursor = GroupCursor::new(store, group);
        cursor.open().unwrap();
        assert_eq!(cursor.state(), CursorState::Active);
        let rows = cursor.drain().unwrap();
        assert_eq!(tables(&rows), vec![1, 2, 2, 1, 2, 2, 1, 2, 2]);
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.next().unwrap(), None);
        // one traversal per row plus the one that found the end
        assert_eq!(cursor.stats().traversals(), 10);
        assert_eq!(cursor.stats().rows(), 9);
        cursor.close();
        cursor.close();
        assert_eq!(cursor.state(), CursorState::Closed);
    }

    #[test]
    fn test_subtree_scan() {
        let (store, group) = setup();
        let mut cursor = GroupCursor::new(store, group);
        cursor
            .rebind(Some(HKey::root(TableId(1), vec![Value::BigInt(2)])), true)
            .unwrap();
        cursor.open().unwrap();
        let rows = cursor.drain().unwrap();
        assert_eq!(tables(&rows), vec![1, 2, 2]);
        assert_eq!(rows[0].value(0), Some(&Value::BigInt(2)));
        assert_eq!(rows[2].value(0), Some(&Value::BigInt(21)));
        assert_eq!(rows[1].hkey().unwrap().parent().unwrap(), *rows[0].hkey().unwrap());
    }

    #[test]
    fn test_point_scan() {
        let (store, group) = setup();
        let mut cursor = GroupCursor::new(store, group);
        cursor
            .rebind(Some(HKey::root(TableId(1), vec![Value::BigInt(3)])), false)
            .unwrap();
        cursor.open().unwrap();
        let rows = cursor.drain().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(cursor.stats().traversals(), 2);

        cursor
            .rebind(Some(HKey::root(TableId(1), vec![Value::BigInt(99)])), false)
            .unwrap();
        cursor.open().unwrap();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.next().unwrap(), None);
    }

    #[test]
    fn test_rebind_and_open_rejected_mid_scan() {
        let (store, group) = setup();
        let mut cursor = GroupCursor::new(store, group);
        cursor.open().unwrap();
        assert!(cursor.next().unwrap().is_some());
        assert_eq!(
            cursor.rebind(None, true).unwrap_err().code(),
            ErrorCode::CursorState
        );
        assert!(cursor.open().is_err());
        cursor.close();
        cursor.rebind(None, true).unwrap();
        cursor.open().unwrap();
        assert_eq!(cursor.drain().unwrap().len(), 9);
    }

    #[test]
    fn test_repeated_cycles() {
        let (store, group) = setup();
        let stats = Arc::new(ScanStats::new());
        let mut cursor = GroupCursor::with_stats(store, group, Arc::clone(&stats));
        for cid in 1..=3 {
            cursor
                .rebind(Some(HKey::root(TableId(1), vec![Value::BigInt(cid)])), true)
                .unwrap();
            cursor.open().unwrap();
            assert_eq!(cursor.drain().unwrap().len(), 3);
            cursor.close();
        }
        assert_eq!(stats.opens(), 3);
        assert_eq!(stats.rows(), 9);
    }

    fn keyed_by(key_type: DataType) -> (Arc<GroupStore>, Arc<Group>) {
        let group = Arc::new(
            GroupBuilder::new(4, "tags")
                .root(
                    TableDef::new("s", "tags")
                        .column("tag", key_type)
                        .primary_key(&["tag"]),
                )
                .child(
                    "tags",
                    TableDef::new("s", "uses")
                        .column("tag", key_type)
                        .column("n", DataType::BigInt)
                        .primary_key(&["n"]),
                    JoinDef::on(&["tag"]),
                )
                .build()
                .unwrap(),
        );
        let store = Arc::new(GroupStore::new(Arc::new(MemKvStore::new())));
        (store, group)
    }

    fn subtree(store: &Arc<GroupStore>, group: &Arc<Group>, anchor: Value) -> Vec<Row> {
        let mut cursor = GroupCursor::new(Arc::clone(store) as Arc<dyn StoreAdapter>, Arc::clone(group));
        cursor.rebind(Some(HKey::root(TableId(1), vec![anchor])), true).unwrap();
        cursor.open().unwrap();
        cursor.drain().unwrap()
    }

    #[test]
    fn test_subtree_of_string_key_with_nul() {
        let (store, group) = keyed_by(DataType::Varchar(16));
        let tags = group.root().row_type();
        let uses = group.table_by_name("uses").unwrap().row_type();
        for tag in ["ab", "ab\0x", "ab\0", "abc"] {
            store
                .write_row(&group, Row::new(Arc::clone(&tags), vec![Value::from(tag)]))
                .unwrap();
            store
                .write_row(&group, Row::new(Arc::clone(&uses), vec![Value::from(tag), Value::BigInt(1)]))
                .unwrap();
        }

        let rows = subtree(&store, &group, Value::from("ab"));
        assert_eq!(tables(&rows), vec![1, 2]);
        assert!(rows.iter().all(|r| r.value(0) == Some(&Value::from("ab"))));

        let rows = subtree(&store, &group, Value::from("ab\0"));
        assert_eq!(tables(&rows), vec![1, 2]);
        assert!(rows.iter().all(|r| r.value(0) == Some(&Value::from("ab\0"))));
    }

    #[test]
    fn test_subtree_of_bytes_key_with_nul() {
        let (store, group) = keyed_by(DataType::Varbinary(16));
        let tags = group.root().row_type();
        let uses = group.table_by_name("uses").unwrap().row_type();
        let keys: [&[u8]; 3] = [b"\x01", b"\x01\x00", b"\x01\x00\xff"];
        for key in keys {
            store
                .write_row(&group, Row::new(Arc::clone(&tags), vec![Value::Bytes(key.to_vec())]))
                .unwrap();
            store
                .write_row(
                    &group,
                    Row::new(Arc::clone(&uses), vec![Value::Bytes(key.to_vec()), Value::BigInt(7)]),
                )
                .unwrap();
        }

        for key in keys {
            let rows = subtree(&store, &group, Value::Bytes(key.to_vec()));
            assert_eq!(tables(&rows), vec![1, 2], "{:?}", key);
            assert!(rows.iter().all(|r| r.value(0) == Some(&Value::Bytes(key.to_vec()))));
        }
    }

    #[test]
    fn test_empty_group() {
        let (_, group) = setup();
        let store = Arc::new(GroupStore::new(Arc::new(MemKvStore::new())));
        let mut cursor = GroupCursor::new(store, group);
        cursor.open().unwrap();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert!(cursor.drain().unwrap().is_empty());
    }
}
