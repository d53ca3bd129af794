//! Store adapter and group storage.

mod adapter;
mod group_store;

pub use adapter::{group_prefix, index_prefix, RawScan, StoreAdapter};
pub use group_store::GroupStore;
