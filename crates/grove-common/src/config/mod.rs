//! Configuration for Grove.
//!
//! `GroveConfig` groups the tunables of the layer. It can be built in code or
//! loaded from a TOML file.

mod grove;

pub use grove::{
    CollationConfig, CollationMode, GroveConfig, GroveConfigBuilder, ScanConfig, SpatialConfig,
};
