//! Row ordering on chosen columns.

use std::cmp::Ordering;

use grove_common::error::{GroveError, GroveResult};

use crate::collation::{Collator, ComparatorCache};
use crate::schema::RowType;

use super::row::Row;
use super::value::Value;

/// Orders rows by a list of columns, comparing collated text columns
/// through their collation scheme.
#[derive(Debug)]
pub struct RowComparator {
    columns: Vec<(usize, Option<Collator>)>,
}

impl RowComparator {
    /// Creates a comparator over `positions` of `row_type`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown position, or whatever the
    /// cache reports for a column's collation scheme.
    pub fn new(cache: &ComparatorCache, row_type: &RowType, positions: &[usize]) -> GroveResult<Self> {
        let mut columns = Vec::with_capacity(positions.len());
        for &position in positions {
            let column = row_type.column(position).ok_or_else(|| {
                GroveError::invalid_argument(format!(
                    "row type {} has no column {}",
                    row_type.table_name(),
                    position
                ))
            })?;
            let collator = match &column.collation {
                Some(scheme) if column.data_type.is_string() => Some(cache.get(scheme)?),
                _ => None,
            };
            columns.push((position, collator));
        }
        Ok(Self { columns })
    }

    /// Compares two rows column by column.
    pub fn compare(&mut self, left: &Row, right: &Row) -> Ordering {
        for (position, collator) in &mut self.columns {
            let a = left.value(*position).unwrap_or(&Value::Null);
            let b = right.value(*position).unwrap_or(&Value::Null);
            let ord = match (a, b, collator) {
                (Value::String(x), Value::String(y), Some(collator)) => collator.compare(x, y),
                _ => a.cmp_natural(b),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
