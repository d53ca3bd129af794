//! # grove-test
//!
//! Integration tests for grove.
//!
//! This crate contains:
//! - Shared schema and data fixtures
//! - Cursor, tuple, collation and spatial scenario tests under `tests/`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Schema and data fixtures
pub mod fixtures;
