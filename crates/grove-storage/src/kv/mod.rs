//! In-memory ordered key-value store.

mod range;
mod scan;
mod store;

pub use range::{strinc, KeyRange};
pub use scan::{RangeScan, ScanEntry};
pub use store::{MemKvStore, StoreStats};
