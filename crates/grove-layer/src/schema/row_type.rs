//! Row types.

use super::table::{Column, TableId, TableName};

/// Shape of the rows of one table: its columns in order, internal ones
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowType {
    table_id: TableId,
    table_name: TableName,
    columns: Vec<Column>,
}

impl RowType {
    /// Creates a row type.
    pub fn new(table_id: TableId, table_name: TableName, columns: Vec<Column>) -> Self {
        Self {
            table_id,
            table_name,
            columns,
        }
    }

    /// Returns the table this row type belongs to.
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Returns the table name.
    pub fn table_name(&self) -> &TableName {
        &self.table_name
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at `position`.
    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row type has no fields.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finds a column by name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
