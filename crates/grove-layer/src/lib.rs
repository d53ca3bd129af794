//! # grove-layer
//!
//! Maps a tree of related tables (a *group*) onto one ordered keyspace.
//!
//! This crate implements:
//! - The schema model: tables, columns, joins, groups and indexes
//! - An order-preserving tuple encoding and the row codec built on it
//! - Hierarchical keys (hkeys) that cluster children under their parents
//! - A group cursor that scans a group, a subtree or a single row
//! - Spatial index keys folding two coordinates into one z-value
//! - Locale-aware string comparison behind a shared comparator cache
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use grove_layer::schema::{DataType, GroupBuilder, TableDef};
//! use grove_layer::row::{Row, Value};
//! use grove_layer::store::GroupStore;
//! use grove_layer::cursor::GroupCursor;
//! use grove_storage::MemKvStore;
//!
//! # fn main() -> grove_common::GroveResult<()> {
//! let group = Arc::new(
//!     GroupBuilder::new(1, "customers")
//!         .root(
//!             TableDef::new("shop", "customers")
//!                 .column("cid", DataType::BigInt)
//!                 .column("name", DataType::Varchar(32))
//!                 .primary_key(&["cid"]),
//!         )
//!         .build()?,
//! );
//! let store = Arc::new(GroupStore::new(Arc::new(MemKvStore::new())));
//! let customers = group.root().row_type();
//! store.write_row(&group, Row::new(customers, vec![Value::BigInt(1), Value::from("ann")]))?;
//!
//! let mut cursor = GroupCursor::new(store, group);
//! cursor.open()?;
//! let row = cursor.next()?.expect("one row");
//! assert_eq!(row.value(1), Some(&Value::from("ann")));
//! cursor.close();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Comparator cache and locale-aware collators
pub mod collation;

/// Row to tuple codec and type allow-list
pub mod codec;

/// Group cursor and scan strategies
pub mod cursor;

/// Hierarchical keys
pub mod hkey;

/// Runtime values, rows and row comparison
pub mod row;

/// Tables, columns, groups and indexes
pub mod schema;

/// Spatial key encoding
pub mod spatial;

/// Store adapter and group storage
pub mod store;

/// Order-preserving tuple encoding
pub mod tuple;

pub use collation::{Collator, ComparatorCache};
pub use codec::{TupleRowCodec, TupleUsage};
pub use cursor::{CursorState, GroupCursor, ScanStats};
pub use hkey::HKey;
pub use row::{Row, RowComparator, Value};
pub use schema::{DataType, Group, GroupBuilder, Index, Table, TableDef};
pub use spatial::{Space, SpatialIndexHandler};
pub use store::{GroupStore, RawScan, StoreAdapter};
pub use tuple::{Element, Tuple};
