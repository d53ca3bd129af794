//! # grove-common
//!
//! Common types, errors, and configuration for Grove.
//!
//! This crate provides the foundational pieces shared by every Grove crate:
//!
//! - **Types**: ordered byte `Key`s and stored `Value`s
//! - **Errors**: unified error handling with `GroveError`
//! - **Config**: layer configuration (`GroveConfig`) loaded from TOML
//! - **Constants**: key subspaces, defaults and limits
//!
//! ## Example
//!
//! ```rust
//! use grove_common::types::{Key, Value};
//! use grove_common::error::GroveResult;
//!
//! fn example() -> GroveResult<()> {
//!     let key = Key::from_bytes(b"hello");
//!     let value = Value::from_bytes(b"world");
//!     assert!(key < Key::from_bytes(b"help"));
//!     assert_eq!(value.len(), 5);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{CollationConfig, CollationMode, GroveConfig, ScanConfig, SpatialConfig};
pub use constants::*;
pub use error::{ErrorCode, GroveError, GroveResult};
pub use types::{Key, Value};
