//! Layer configuration structures.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COLLATION_CACHE_CAPACITY, DEFAULT_COLLATION_TTL_SECS, DEFAULT_LATITUDE_BITS,
    DEFAULT_LONGITUDE_BITS, DEFAULT_SCAN_BATCH_SIZE, MAX_Z_BITS,
};
use crate::error::{GroveError, GroveResult};

/// Top-level layer configuration.
///
/// # Example
///
/// ```rust
/// use grove_common::config::{CollationMode, GroveConfig};
///
/// let config = GroveConfig::builder()
///     .collation_mode(CollationMode::Loose)
///     .scan_batch_size(64)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.collation.mode, CollationMode::Loose);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroveConfig {
    /// Comparator cache configuration.
    #[serde(default)]
    pub collation: CollationConfig,

    /// Store scan configuration.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Spatial index configuration.
    #[serde(default)]
    pub spatial: SpatialConfig,
}

impl GroveConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a small configuration for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            collation: CollationConfig {
                cache_capacity: 8,
                ..Default::default()
            },
            scan: ScanConfig { batch_size: 4 },
            spatial: SpatialConfig::default(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serializes configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> GroveResult<()> {
        if self.collation.cache_capacity == 0 {
            return Err(GroveError::invalid_config(
                "collation.cache_capacity must be at least 1",
            ));
        }

        if self.scan.batch_size == 0 {
            return Err(GroveError::invalid_config(
                "scan.batch_size must be at least 1",
            ));
        }

        let spatial = &self.spatial;
        if spatial.latitude_bits == 0 || spatial.longitude_bits == 0 {
            return Err(GroveError::invalid_config(
                "spatial bit budgets must be non-zero",
            ));
        }

        let total = spatial.latitude_bits + spatial.longitude_bits;
        if total > MAX_Z_BITS {
            return Err(GroveError::invalid_config(format!(
                "spatial bit budgets sum to {total}, maximum is {MAX_Z_BITS}"
            )));
        }

        Ok(())
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> GroveConfigBuilder {
        GroveConfigBuilder::new()
    }
}

// =============================================================================
// Collation
// =============================================================================

/// How the comparator cache treats scheme names it cannot resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollationMode {
    /// Unknown schemes are an error.
    #[default]
    Strict,
    /// Unknown schemes fall back to binary ordering with a warning.
    Loose,
    /// Every scheme is binary.
    Disabled,
}

impl fmt::Display for CollationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

impl FromStr for CollationMode {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            "disabled" => Ok(Self::Disabled),
            other => Err(GroveError::invalid_config(format!(
                "unknown collation mode '{other}'"
            ))),
        }
    }
}

/// Comparator cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollationConfig {
    /// Initial resolution mode.
    #[serde(default)]
    pub mode: CollationMode,

    /// Maximum number of recipes kept alive.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Seconds a recipe survives without use. Zero keeps recipes until
    /// evicted by capacity.
    #[serde(default = "default_handle_ttl")]
    pub handle_ttl_secs: u64,
}

fn default_cache_capacity() -> usize {
    DEFAULT_COLLATION_CACHE_CAPACITY
}

fn default_handle_ttl() -> u64 {
    DEFAULT_COLLATION_TTL_SECS
}

impl Default for CollationConfig {
    fn default() -> Self {
        Self {
            mode: CollationMode::default(),
            cache_capacity: default_cache_capacity(),
            handle_ttl_secs: default_handle_ttl(),
        }
    }
}

impl CollationConfig {
    /// Returns the handle TTL, or `None` when expiry is disabled.
    #[must_use]
    pub fn handle_ttl(&self) -> Option<Duration> {
        (self.handle_ttl_secs > 0).then(|| Duration::from_secs(self.handle_ttl_secs))
    }
}

// =============================================================================
// Scan
// =============================================================================

/// Store scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Entries fetched per store read.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_SCAN_BATCH_SIZE
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

// =============================================================================
// Spatial
// =============================================================================

/// Spatial index configuration for the latitude/longitude space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Bits given to latitude.
    #[serde(default = "default_latitude_bits")]
    pub latitude_bits: u32,

    /// Bits given to longitude.
    #[serde(default = "default_longitude_bits")]
    pub longitude_bits: u32,
}

fn default_latitude_bits() -> u32 {
    DEFAULT_LATITUDE_BITS
}

fn default_longitude_bits() -> u32 {
    DEFAULT_LONGITUDE_BITS
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            latitude_bits: default_latitude_bits(),
            longitude_bits: default_longitude_bits(),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`GroveConfig`].
#[derive(Debug, Default)]
pub struct GroveConfigBuilder {
    config: GroveConfig,
}

impl GroveConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collation mode.
    #[must_use]
    pub fn collation_mode(mut self, mode: CollationMode) -> Self {
        self.config.collation.mode = mode;
        self
    }

    /// Sets the comparator cache capacity.
    #[must_use]
    pub fn collation_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.collation.cache_capacity = capacity;
        self
    }

    /// Sets the comparator handle TTL in seconds.
    #[must_use]
    pub fn collation_ttl_secs(mut self, secs: u64) -> Self {
        self.config.collation.handle_ttl_secs = secs;
        self
    }

    /// Sets the scan batch size.
    #[must_use]
    pub fn scan_batch_size(mut self, batch_size: usize) -> Self {
        self.config.scan.batch_size = batch_size;
        self
    }

    /// Sets the latitude and longitude bit budgets.
    #[must_use]
    pub fn spatial_bits(mut self, latitude_bits: u32, longitude_bits: u32) -> Self {
        self.config.spatial.latitude_bits = latitude_bits;
        self.config.spatial.longitude_bits = longitude_bits;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> GroveConfig {
        self.config
    }
}
