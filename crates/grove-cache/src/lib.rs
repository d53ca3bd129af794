//! Caching utilities for Grove.
//!
//! - **Soft cache**: a concurrent map bounded by size and by time since last
//!   access, used to keep expensive, rebuildable objects alive while they are
//!   in use and let them go when they are not
//! - **Stats**: lock-free counters shared by the caches
//!
//! # Example
//!
//! ```rust
//! use grove_cache::{CacheConfig, SoftCache};
//! use std::time::Duration;
//!
//! let cache = SoftCache::new(CacheConfig::with_capacity(2).with_ttl(Duration::from_secs(60)));
//! cache.insert("en_us_ci", 1u32);
//! assert_eq!(cache.get(&"en_us_ci"), Some(1));
//! assert_eq!(cache.stats().hits(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod soft;
pub mod stats;

pub use soft::SoftCache;
pub use stats::{CacheStats, CacheStatsSnapshot};

use std::time::Duration;

/// Default capacity for caches when not specified.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Configuration for cache behavior.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub capacity: usize,
    /// Lifetime of an entry since its last access (`None` = no TTL).
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: None,
        }
    }
}

impl CacheConfig {
    /// Creates a new config with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the TTL from seconds, where zero disables expiry.
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}
