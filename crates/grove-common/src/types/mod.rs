//! Byte-level types shared by the store and the layer above it.

mod keys;

pub use keys::{Key, Value};
