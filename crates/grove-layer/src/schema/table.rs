//! Tables, columns and joins.

use std::fmt;
use std::sync::Arc;

use grove_common::constants::HIDDEN_PK_COLUMN;

use super::row_type::RowType;
use super::types::DataType;

/// Identifier of a table inside its group: its pre-order ordinal, root = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl TableId {
    /// Returns the ordinal.
    #[inline]
    pub fn ordinal(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    /// Schema.
    pub schema: String,
    /// Table.
    pub table: String,
}

impl TableName {
    /// Creates a table name.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Returns `schema.table.column`.
    pub fn qualify(&self, column: &str) -> String {
        format!("{}.{}.{}", self.schema, self.table, column)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Collation scheme name for string columns.
    pub collation: Option<String>,
    /// True for columns the layer adds itself.
    pub internal: bool,
}

impl Column {
    /// Creates a nullable column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            collation: None,
            internal: false,
        }
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the collation scheme name.
    pub fn with_collation(mut self, scheme: impl Into<String>) -> Self {
        self.collation = Some(scheme.into());
        self
    }

    pub(crate) fn hidden_pk() -> Self {
        Self {
            name: HIDDEN_PK_COLUMN.to_string(),
            data_type: DataType::BigInt,
            nullable: false,
            collation: None,
            internal: true,
        }
    }
}

/// Declaration of a table before it joins a group.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub(crate) name: TableName,
    pub(crate) columns: Vec<Column>,
    pub(crate) primary_key: Vec<String>,
}

impl TableDef {
    /// Starts a table declaration.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: TableName::new(schema, table),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Adds a nullable column.
    pub fn column(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.add(Column::new(name, data_type))
    }

    /// Adds a prepared column.
    pub fn add(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Declares the primary key. Without one the table gets a hidden
    /// `__row_id` key column.
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Returns the table name.
    pub fn name(&self) -> &TableName {
        &self.name
    }
}

/// One column pair of a parent join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinColumn {
    /// Position in the child table.
    pub child: usize,
    /// Position in the parent table.
    pub parent: usize,
}

/// The join from a child table to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Parent table.
    pub parent: TableId,
    /// Column pairs.
    pub columns: Vec<JoinColumn>,
}

impl Join {
    /// Maps a parent column position to the child column joined to it.
    pub fn child_position(&self, parent_position: usize) -> Option<usize> {
        self.columns
            .iter()
            .find(|jc| jc.parent == parent_position)
            .map(|jc| jc.child)
    }
}

/// Columns of a table row that supply one hkey segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HKeyColumns {
    /// Table whose segment this is.
    pub table: TableId,
    /// Row positions, in segment order.
    pub positions: Vec<usize>,
}

/// A table placed in a group.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    name: TableName,
    columns: Vec<Column>,
    primary_key: Vec<usize>,
    parent: Option<Join>,
    children: Vec<TableId>,
    depth: usize,
    hkey_layout: Vec<HKeyColumns>,
    row_type: Arc<RowType>,
}

impl Table {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: TableId,
        name: TableName,
        columns: Vec<Column>,
        primary_key: Vec<usize>,
        parent: Option<Join>,
        children: Vec<TableId>,
        depth: usize,
        hkey_layout: Vec<HKeyColumns>,
    ) -> Self {
        let row_type = Arc::new(RowType::new(id, name.clone(), columns.clone()));
        Self {
            id,
            name,
            columns,
            primary_key,
            parent,
            children,
            depth,
            hkey_layout,
            row_type,
        }
    }

    /// Returns the table id.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Returns the qualified name.
    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Returns all columns, internal ones included.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at `position`.
    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    /// Finds a column by name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns primary-key column positions.
    pub fn primary_key(&self) -> &[usize] {
        &self.primary_key
    }

    /// Returns the position of the hidden key column, if the table has one.
    pub fn hidden_pk_position(&self) -> Option<usize> {
        match self.primary_key.as_slice() {
            [pos] if self.columns[*pos].internal => Some(*pos),
            _ => None,
        }
    }

    /// Returns the join to the parent, `None` for the root.
    pub fn parent(&self) -> Option<&Join> {
        self.parent.as_ref()
    }

    /// Returns true for the group root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns direct children in declaration order.
    pub fn children(&self) -> &[TableId] {
        &self.children
    }

    /// Returns the depth below the root (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns how each hkey segment is read from this table's rows.
    pub fn hkey_layout(&self) -> &[HKeyColumns] {
        &self.hkey_layout
    }

    /// Returns the row type of this table.
    pub fn row_type(&self) -> Arc<RowType> {
        Arc::clone(&self.row_type)
    }

    /// Returns `schema.table.column` for the column at `position`.
    pub fn qualified_column(&self, position: usize) -> String {
        match self.columns.get(position) {
            Some(column) => self.name.qualify(&column.name),
            None => self.name.qualify(&format!("#{position}")),
        }
    }
}
