//! # grove-storage
//!
//! Ordered key-value store for Grove.
//!
//! The layer only needs a store that offers atomic point reads and writes
//! over byte keys plus ascending range scans. This crate provides an
//! in-memory implementation of that contract:
//! - `MemKvStore`: a sorted map behind a read-write lock
//! - `RangeScan`: a lazy scan that reads the map in batches
//! - `KeyRange` and `strinc` for building prefix ranges

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Key-value store, ranges and scans
pub mod kv;

pub use kv::{strinc, KeyRange, MemKvStore, RangeScan, ScanEntry, StoreStats};
