//! Runtime values, rows and row ordering.

mod compare;
#[allow(clippy::module_inception)]
mod row;
mod value;

pub use compare::RowComparator;
pub use row::Row;
pub use value::Value;
