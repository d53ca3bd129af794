//! Group cursor scenarios over the customer/order/item fixture.

use std::sync::Arc;

use grove_common::error::{GroveError, GroveResult};
use grove_common::types::{Key, Value as StoredValue};
use grove_common::ErrorCode;
use grove_layer::cursor::{CursorState, GroupCursor, ScanStats};
use grove_layer::row::{Row, Value};
use grove_layer::schema::TableId;
use grove_layer::store::{GroupStore, RawScan, StoreAdapter};
use grove_storage::ScanEntry;
use grove_test::fixtures::{
    customer_hkey, item_id, order_hkey, order_id, populated_store, ADDRESSES, CUSTOMERS, ITEMS,
    ORDERS,
};

fn tables(rows: &[Row]) -> Vec<TableId> {
    rows.iter().map(|r| r.row_type().table_id()).collect()
}

#[test]
fn test_full_scan_is_parent_first() {
    let (store, group, population) = populated_store(3);
    let mut cursor = GroupCursor::new(store, group);
    cursor.open().unwrap();
    let rows = cursor.drain().unwrap();
    assert_eq!(rows.len(), population.total());

    let first_customer = &tables(&rows)[..population.per_customer()];
    assert_eq!(
        first_customer,
        &[CUSTOMERS, ORDERS, ITEMS, ITEMS, ORDERS, ITEMS, ITEMS, ADDRESSES]
    );

    // every row follows its parent
    for (i, row) in rows.iter().enumerate() {
        let hkey = row.hkey().unwrap();
        if let Some(parent) = hkey.parent() {
            assert!(rows[..i].iter().any(|r| r.hkey() == Some(&parent)));
        }
    }
}

#[test]
fn test_subtree_of_order() {
    let (store, group, _) = populated_store(2);
    let mut cursor = GroupCursor::new(store, group);
    let oid = order_id(2, 1);
    cursor.rebind(Some(order_hkey(2, oid)), true).unwrap();
    cursor.open().unwrap();
    let rows = cursor.drain().unwrap();

    assert_eq!(tables(&rows), vec![ORDERS, ITEMS, ITEMS]);
    assert_eq!(rows[0].value(0), Some(&Value::BigInt(oid)));
    assert_eq!(rows[1].value(0), Some(&Value::BigInt(item_id(oid, 0))));
    assert_eq!(rows[2].value(0), Some(&Value::BigInt(item_id(oid, 1))));
}

#[test]
fn test_subtree_of_customer_excludes_neighbours() {
    let (store, group, population) = populated_store(4);
    let mut cursor = GroupCursor::new(store, group);
    cursor.rebind(Some(customer_hkey(2)), true).unwrap();
    cursor.open().unwrap();
    let rows = cursor.drain().unwrap();
    assert_eq!(rows.len(), population.per_customer());
    let anchor = customer_hkey(2);
    assert_eq!(rows[0].hkey(), Some(&anchor));
    assert!(rows[1..]
        .iter()
        .all(|r| anchor.is_ancestor_of(r.hkey().unwrap())));
}

#[test]
fn test_point_read_without_descendants() {
    let (store, group, _) = populated_store(8);
    let mut cursor = GroupCursor::new(store, group);
    cursor.rebind(Some(customer_hkey(3)), false).unwrap();
    cursor.open().unwrap();
    let row = cursor.next().unwrap().unwrap();
    assert_eq!(row.value(1), Some(&Value::from("customer 3")));
    assert_eq!(cursor.next().unwrap(), None);
    assert_eq!(cursor.state(), CursorState::Idle);
}

#[test]
fn test_missing_anchor() {
    let (store, group, _) = populated_store(8);
    let mut cursor = GroupCursor::new(store, group);
    for deep in [true, false] {
        cursor.rebind(Some(customer_hkey(42)), deep).unwrap();
        cursor.open().unwrap();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.next().unwrap(), None);
        cursor.close();
    }
}

#[test]
fn test_hidden_key_rows_round_trip() {
    let (store, group, population) = populated_store(8);
    let mut cursor = GroupCursor::new(store, group);
    cursor.open().unwrap();
    let addresses: Vec<Row> = cursor
        .drain()
        .unwrap()
        .into_iter()
        .filter(|r| r.row_type().table_id() == ADDRESSES)
        .collect();
    assert_eq!(addresses.len(), population.customers as usize);
    let ids: Vec<&Value> = addresses.iter().map(|r| r.value(2).unwrap()).collect();
    assert_eq!(ids, vec![&Value::BigInt(1), &Value::BigInt(2), &Value::BigInt(3)]);
}

#[test]
fn test_lifecycle_errors() {
    let (store, group, _) = populated_store(8);
    let mut cursor = GroupCursor::new(store, group);
    assert_eq!(cursor.state(), CursorState::Closed);
    assert_eq!(cursor.next().unwrap_err().code(), ErrorCode::CursorState);

    cursor.open().unwrap();
    let err = cursor.open().unwrap_err();
    assert!(err.to_string().contains("active"));
    assert!(cursor.rebind(None, true).is_err());

    cursor.close();
    cursor.close();
    assert!(cursor.next().is_err());
}

#[test]
fn test_rebind_cycles_share_stats() {
    let (store, group, population) = populated_store(2);
    let stats = Arc::new(ScanStats::new());
    let mut cursor = GroupCursor::with_stats(store, group, Arc::clone(&stats));
    for cid in 1..=population.customers {
        cursor.rebind(Some(customer_hkey(cid)), true).unwrap();
        cursor.open().unwrap();
        assert_eq!(cursor.drain().unwrap().len(), population.per_customer());
        cursor.close();
    }
    assert_eq!(stats.opens(), population.customers as u64);
    assert_eq!(stats.rows(), population.total() as u64);
    // each drain ends with one traversal that finds nothing
    assert_eq!(stats.traversals(), (population.total() + population.customers as usize) as u64);
}

#[test]
fn test_deleted_rows_disappear() {
    let (store, group, population) = populated_store(8);
    assert!(store.delete_row(&group, &customer_hkey(1)).unwrap());
    let mut cursor = GroupCursor::new(Arc::clone(&store) as Arc<dyn StoreAdapter>, group);
    cursor.open().unwrap();
    let rows = cursor.drain().unwrap();
    assert_eq!(rows.len(), population.total() - 1);
    // orphans are still returned, parent first order intact
    assert_eq!(rows[0].row_type().table_id(), ORDERS);
}

/// Adapter that answers every scan with one entry outside the group.
struct ForeignKeyAdapter {
    inner: Arc<GroupStore>,
}

struct OneEntry {
    entry: Option<ScanEntry>,
    taken: bool,
}

impl RawScan for OneEntry {
    fn next_raw_entry(&mut self) -> GroveResult<bool> {
        if self.taken {
            self.entry = None;
            return Ok(false);
        }
        self.taken = true;
        Ok(self.entry.is_some())
    }

    fn current(&self) -> Option<&ScanEntry> {
        self.entry.as_ref()
    }
}

impl StoreAdapter for ForeignKeyAdapter {
    fn raw_scan(&self, _: Option<&[u8]>, _: Option<&[u8]>) -> GroveResult<Box<dyn RawScan>> {
        Ok(Box::new(OneEntry {
            entry: Some(ScanEntry::new(
                Key::from_bytes(b"\xfe\x01"),
                StoredValue::from_bytes(b""),
            )),
            taken: false,
        }))
    }

    fn get(&self, key: &[u8]) -> GroveResult<Option<StoredValue>> {
        self.inner.get(key)
    }
}

#[test]
fn test_foreign_key_is_corruption() {
    let (store, group, _) = populated_store(8);
    let adapter = Arc::new(ForeignKeyAdapter { inner: store });
    let mut cursor = GroupCursor::new(adapter, group);
    cursor.open().unwrap();
    let err: GroveError = cursor.next().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Corruption);
}
