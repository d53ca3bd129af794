//! Rows of groups kept in a [`MemKvStore`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use grove_common::error::{GroveError, GroveResult};
use grove_common::types::{Key, Value as StoredValue};
use grove_storage::{KeyRange, MemKvStore};

use crate::codec::{value_to_element, TupleRowCodec};
use crate::hkey::HKey;
use crate::row::{Row, Value};
use crate::schema::{Group, Index, Table, TableId};
use crate::spatial::SpatialIndexHandler;
use crate::tuple::encode_element;

use super::adapter::{index_prefix, RawScan, StoreAdapter};

/// Group storage over the in-memory ordered store.
///
/// Row keys are the group prefix followed by the row's hkey; values are the
/// packed row. Index entries carry their key fields followed by the hkey of
/// the row they point to, with an empty value.
#[derive(Debug)]
pub struct GroupStore {
    kv: Arc<MemKvStore>,
    codec: TupleRowCodec,
    row_ids: Mutex<HashMap<(u32, TableId), i64>>,
}

impl GroupStore {
    /// Wraps a store.
    pub fn new(kv: Arc<MemKvStore>) -> Self {
        Self {
            kv,
            codec: TupleRowCodec::new(),
            row_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying store.
    pub fn kv(&self) -> &Arc<MemKvStore> {
        &self.kv
    }

    /// Writes a row at the hkey derived from its own key columns.
    ///
    /// A NULL hidden key is filled with the next row id of its table.
    pub fn write_row(&self, group: &Group, mut row: Row) -> GroveResult<HKey> {
        let table = table_of(group, &row)?;
        if let Some(pos) = table.hidden_pk_position() {
            if row.value(pos).map_or(true, Value::is_null) {
                let id = self.next_row_id(group, table.id())?;
                row.set(pos, Value::BigInt(id))?;
            }
        }
        let hkey = HKey::from_row(table, &row)?;
        self.write_row_at(group, &hkey, &row)?;
        Ok(hkey)
    }

    /// Writes a row at an hkey the caller already knows.
    pub fn write_row_at(&self, group: &Group, hkey: &HKey, row: &Row) -> GroveResult<()> {
        let table = table_of(group, row)?;
        if hkey.table() != Some(table.id()) {
            return Err(GroveError::invalid_argument(format!(
                "hkey {} does not name a row of {}",
                hkey,
                table.name()
            )));
        }
        let key = self.encode_hkey_prefix(group, hkey)?;
        let value = self.codec.encode_bytes(row)?;
        trace!(table = %table.name(), %hkey, "write row");
        self.kv.put(key, StoredValue::from_vec(value))?;
        Ok(())
    }

    /// Reads the row at `hkey`.
    pub fn read_row(&self, group: &Group, hkey: &HKey) -> GroveResult<Option<Row>> {
        let table = hkey
            .table()
            .and_then(|id| group.table(id))
            .ok_or_else(|| GroveError::invalid_argument(format!("hkey {} names no table", hkey)))?;
        let key = self.encode_hkey_prefix(group, hkey)?;
        match self.kv.get(key.as_bytes()) {
            Some(bytes) => {
                let row = self.codec.decode_bytes(bytes.as_bytes(), &table.row_type())?;
                Ok(Some(row.with_hkey(hkey.clone())))
            }
            None => Ok(None),
        }
    }

    /// Deletes the row at `hkey`, leaving its descendants in place.
    pub fn delete_row(&self, group: &Group, hkey: &HKey) -> GroveResult<bool> {
        let key = self.encode_hkey_prefix(group, hkey)?;
        Ok(self.kv.delete(key.as_bytes()).is_some())
    }

    /// Writes the index entry of `row`.
    ///
    /// Spatial indexes need their handler, which folds the coordinates.
    pub fn write_index_row(
        &self,
        group: &Group,
        index: &Index,
        spatial: Option<&SpatialIndexHandler>,
        row: &Row,
    ) -> GroveResult<Key> {
        let table = table_of(group, row)?;
        if index.table() != table.id() {
            return Err(GroveError::invalid_argument(format!(
                "index '{}' is not on table {}",
                index.name(),
                table.name()
            )));
        }
        let mut buf = index_prefix(index.id())?.as_bytes().to_vec();
        match spatial {
            Some(handler) => {
                for field in 0..index.key_columns().len() {
                    handler.append_key_field(&mut buf, row, field)?;
                }
            }
            None if index.spatial_spec().is_some() => {
                return Err(GroveError::invalid_argument(format!(
                    "spatial index '{}' needs its handler",
                    index.name()
                )))
            }
            None => {
                for &pos in index.key_columns() {
                    let value = row.value(pos).unwrap_or(&Value::Null);
                    encode_element(&mut buf, &value_to_element(value)?)?;
                }
            }
        }
        let hkey = match row.hkey() {
            Some(hkey) => hkey.clone(),
            None => HKey::from_row(table, row)?,
        };
        hkey.encode_into(&mut buf)?;

        let key = Key::from_vec(buf);
        self.kv.put(key.clone(), StoredValue::empty())?;
        Ok(key)
    }

    /// Returns the entry keys of an index in key order.
    pub fn index_keys(&self, index: &Index) -> GroveResult<Vec<Key>> {
        let range = KeyRange::prefix(&index_prefix(index.id())?)?;
        Ok(self.kv.scan(range).map(|entry| entry.key).collect())
    }

    /// Next hidden key of `table`, seeded on first use from the largest one
    /// already stored so that a second store over the same keys continues
    /// the sequence.
    fn next_row_id(&self, group: &Group, table: TableId) -> GroveResult<i64> {
        let mut ids = self.row_ids.lock();
        let slot = (group.id(), table);
        if !ids.contains_key(&slot) {
            let seed = self.max_stored_row_id(group, table)?;
            ids.insert(slot, seed);
        }
        let next = ids.entry(slot).or_insert(0);
        *next = next
            .checked_add(1)
            .ok_or_else(|| GroveError::invalid_argument(format!("row ids of table {} exhausted", table)))?;
        Ok(*next)
    }

    fn max_stored_row_id(&self, group: &Group, table: TableId) -> GroveResult<i64> {
        let prefix = self.group_prefix(group)?;
        let mut max = 0;
        for entry in self.kv.scan(KeyRange::prefix(&prefix)?) {
            let hkey = HKey::decode(group, &entry.key.as_bytes()[prefix.len()..])?;
            if hkey.table() != Some(table) {
                continue;
            }
            let id = hkey.segments().last().and_then(|s| s.values.last());
            if let Some(Value::BigInt(id)) = id {
                max = max.max(*id);
            }
        }
        trace!(group = %group.name(), %table, max, "seeded row ids");
        Ok(max)
    }
}

fn table_of<'g>(group: &'g Group, row: &Row) -> GroveResult<&'g Arc<Table>> {
    let id = row.row_type().table_id();
    group
        .table(id)
        .filter(|t| t.name() == row.row_type().table_name())
        .ok_or_else(|| {
            GroveError::invalid_argument(format!(
                "row of {} does not belong to group '{}'",
                row.row_type().table_name(),
                group.name()
            ))
        })
}

impl StoreAdapter for GroupStore {
    fn raw_scan(&self, lower: Option<&[u8]>, upper: Option<&[u8]>) -> GroveResult<Box<dyn RawScan>> {
        Ok(Box::new(self.kv.scan(KeyRange::between(lower, upper))))
    }

    fn get(&self, key: &[u8]) -> GroveResult<Option<StoredValue>> {
        Ok(self.kv.get(key))
    }
}
