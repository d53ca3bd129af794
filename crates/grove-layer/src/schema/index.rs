//! Index declarations.

use grove_common::error::{GroveError, GroveResult};

use super::table::{Column, Table, TableId};

/// Spatial part of an index: a run of key fields folded into one z-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialSpec {
    /// Position within the index key of the first coordinate.
    pub first_spatial_field: usize,
    /// Number of coordinate fields.
    pub dimensions: usize,
}

impl SpatialSpec {
    /// Position within the index key of the last coordinate.
    pub fn last_spatial_field(&self) -> usize {
        self.first_spatial_field + self.dimensions.saturating_sub(1)
    }
}

/// An index over one table of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    id: u32,
    name: String,
    table: TableId,
    key_columns: Vec<usize>,
    key_defs: Vec<Column>,
    qualified: Vec<String>,
    spatial: Option<SpatialSpec>,
}

impl Index {
    /// Declares an index on `table` over the named columns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the column list is empty or names an
    /// unknown column.
    pub fn new(id: u32, name: impl Into<String>, table: &Table, columns: &[&str]) -> GroveResult<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(GroveError::invalid_argument(format!(
                "index '{}' has no key columns",
                name
            )));
        }

        let mut key_columns = Vec::with_capacity(columns.len());
        for column in columns {
            let pos = table.position_of(column).ok_or_else(|| {
                GroveError::invalid_argument(format!(
                    "index '{}': column '{}' not found in table {}",
                    name,
                    column,
                    table.name()
                ))
            })?;
            key_columns.push(pos);
        }

        let key_defs = key_columns.iter().map(|&p| table.columns()[p].clone()).collect();
        let qualified = key_columns.iter().map(|&p| table.qualified_column(p)).collect();
        Ok(Self {
            id,
            name,
            table: table.id(),
            key_columns,
            key_defs,
            qualified,
            spatial: None,
        })
    }

    /// Marks `dimensions` key fields starting at `first_spatial_field` as
    /// spatial coordinates.
    pub fn spatial(mut self, first_spatial_field: usize, dimensions: usize) -> Self {
        self.spatial = Some(SpatialSpec {
            first_spatial_field,
            dimensions,
        });
        self
    }

    /// Returns the store-wide index id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the indexed table.
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Row positions of the key columns, in key order.
    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    /// Column definitions of the key, in key order.
    pub fn key_column_defs(&self) -> &[Column] {
        &self.key_defs
    }

    /// `schema.table.column` of each key field.
    pub fn qualified_key_columns(&self) -> &[String] {
        &self.qualified
    }

    /// Returns the spatial declaration, if any.
    pub fn spatial_spec(&self) -> Option<SpatialSpec> {
        self.spatial
    }
}
