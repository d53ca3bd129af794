//! Schema model: data types, tables, groups and indexes.
//!
//! These are the descriptions the layer receives from the catalog. They are
//! immutable once built and shared behind `Arc`.

mod group;
mod index;
mod row_type;
mod table;
mod types;

pub use group::{Group, GroupBuilder, JoinDef};
pub use index::{Index, SpatialSpec};
pub use row_type::RowType;
pub use table::{Column, HKeyColumns, Join, JoinColumn, Table, TableDef, TableId, TableName};
pub use types::DataType;
