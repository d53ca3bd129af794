//! Rows.

use std::sync::Arc;

use grove_common::error::{GroveError, GroveResult};

use crate::hkey::HKey;
use crate::schema::RowType;

use super::value::Value;

/// One row of a table: a value per column, internal columns included.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    row_type: Arc<RowType>,
    values: Vec<Value>,
    hkey: Option<HKey>,
}

impl Row {
    /// Creates a row. The value count is checked when the row is encoded.
    pub fn new(row_type: Arc<RowType>, values: Vec<Value>) -> Self {
        Self {
            row_type,
            values,
            hkey: None,
        }
    }

    /// Attaches the hkey the row lives at.
    pub fn with_hkey(mut self, hkey: HKey) -> Self {
        self.hkey = Some(hkey);
        self
    }

    /// Returns the row type.
    pub fn row_type(&self) -> &Arc<RowType> {
        &self.row_type
    }

    /// Returns the value at `position`.
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    /// Returns all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the hkey the row was read at or written to.
    pub fn hkey(&self) -> Option<&HKey> {
        self.hkey.as_ref()
    }

    /// Replaces the value at `position`.
    pub fn set(&mut self, position: usize, value: Value) -> GroveResult<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(position).ok_or_else(|| {
            GroveError::invalid_argument(format!(
                "position {} out of range for row of {} values",
                position, len
            ))
        })?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn set_hkey(&mut self, hkey: HKey) {
        self.hkey = Some(hkey);
    }

    /// Consumes the row, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
