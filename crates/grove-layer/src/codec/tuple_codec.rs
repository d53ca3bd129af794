//! Row to tuple codec.

use std::sync::Arc;

use tracing::trace;

use grove_common::error::{GroveError, GroveResult};

use crate::row::Row;
use crate::schema::{Group, Index, RowType, Table};
use crate::tuple::Tuple;

use super::convert::{element_to_value, value_to_element};

/// Which columns of a table end up in tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleUsage {
    /// Only primary-key columns (the table stores rows elsewhere).
    KeyOnly,
    /// Every column, internal ones included.
    KeyAndRow,
}

/// Encodes rows as tuples and checks which column types can be stored.
///
/// The codec holds no state, so one instance can be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleRowCodec;

impl TupleRowCodec {
    /// Creates a codec.
    pub fn new() -> Self {
        Self
    }

    /// Returns the qualified names of the columns of `table` whose type
    /// cannot be stored in a tuple.
    pub fn check_table_types(&self, table: &Table, usage: TupleUsage) -> Vec<String> {
        let positions: Vec<usize> = match usage {
            TupleUsage::KeyOnly => table.primary_key().to_vec(),
            TupleUsage::KeyAndRow => (0..table.columns().len()).collect(),
        };
        positions
            .into_iter()
            .filter(|&p| {
                table
                    .column(p)
                    .is_some_and(|c| !c.data_type.is_tuple_encodable())
            })
            .map(|p| table.qualified_column(p))
            .collect()
    }

    /// Like [`check_table_types`](Self::check_table_types), over `table` and
    /// all of its descendants.
    pub fn check_group_types(&self, group: &Group, table: &Table, usage: TupleUsage) -> Vec<String> {
        let mut bad = self.check_table_types(table, usage);
        for id in group.descendants(table.id()) {
            if let Some(child) = group.table(id) {
                bad.extend(self.check_table_types(child, usage));
            }
        }
        bad
    }

    /// Returns the qualified names of the key columns of `index` whose type
    /// cannot be stored in a tuple.
    pub fn check_index_types(&self, index: &Index) -> Vec<String> {
        index
            .key_column_defs()
            .iter()
            .zip(index.qualified_key_columns())
            .filter(|(c, _)| !c.data_type.is_tuple_encodable())
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Rejects a group that has any column the codec cannot store.
    pub fn validate_group(&self, group: &Group) -> GroveResult<()> {
        let bad = self.check_group_types(group, group.root(), TupleUsage::KeyAndRow);
        if bad.is_empty() {
            Ok(())
        } else {
            Err(GroveError::invalid_config(format!(
                "group '{}' has columns that cannot be stored: {}",
                group.name(),
                bad.join(", ")
            )))
        }
    }

    /// Encodes every field of `row` in column order.
    pub fn encode(&self, row: &Row) -> GroveResult<Tuple> {
        let expected = row.row_type().len();
        if row.len() != expected {
            return Err(GroveError::RowShapeMismatch {
                expected,
                actual: row.len(),
            });
        }
        row.values().iter().map(value_to_element).collect()
    }

    /// Decodes `tuple` positionally into a row of `row_type`.
    pub fn decode(&self, tuple: Tuple, row_type: &Arc<RowType>) -> GroveResult<Row> {
        if tuple.len() != row_type.len() {
            return Err(GroveError::TupleSizeMismatch {
                expected: row_type.len(),
                actual: tuple.len(),
            });
        }
        let values = tuple
            .into_elements()
            .into_iter()
            .zip(row_type.columns())
            .map(|(element, column)| element_to_value(element, column))
            .collect::<GroveResult<Vec<_>>>()?;
        Ok(Row::new(Arc::clone(row_type), values))
    }

    /// Encodes `row` straight to bytes.
    pub fn encode_bytes(&self, row: &Row) -> GroveResult<Vec<u8>> {
        self.encode(row)?.pack()
    }

    /// Decodes bytes written by [`encode_bytes`](Self::encode_bytes).
    pub fn decode_bytes(&self, bytes: &[u8], row_type: &Arc<RowType>) -> GroveResult<Row> {
        let row = self.decode(Tuple::unpack(bytes)?, row_type)?;
        trace!(table = %row_type.table_name(), fields = row.len(), "decoded row");
        Ok(row)
    }
}
