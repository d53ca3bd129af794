//! Shared cache of collation recipes.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use grove_cache::{CacheConfig, CacheStats, SoftCache};
use grove_common::config::{CollationConfig, CollationMode};
use grove_common::constants::{BINARY_COLLATION_ID, FIRST_COLLATION_ID};
use grove_common::error::{GroveError, GroveResult};

use super::collator::{CollationRecipe, Collator};
use super::scheme::CollationScheme;

/// Hands out collators, building each scheme's recipe at most once while it
/// stays in use.
///
/// Recipes are held softly: an entry unused for longer than the configured
/// TTL, or pushed out by capacity, is dropped and rebuilt on the next
/// request. Scheme ids are assigned once and survive rebuilds.
///
/// # Example
///
/// ```rust
/// use grove_common::config::{CollationConfig, CollationMode};
/// use grove_layer::collation::ComparatorCache;
///
/// let cache = ComparatorCache::new(&CollationConfig::default());
/// let mut collator = cache.get("en_us_ci").unwrap();
/// assert!(collator.equals("Grove", "GROVE"));
///
/// cache.set_mode(CollationMode::Disabled);
/// assert!(cache.get("en_us_ci").unwrap().is_binary());
/// ```
pub struct ComparatorCache {
    initial_mode: CollationMode,
    mode: RwLock<CollationMode>,
    ids: DashMap<String, u32>,
    names: DashMap<u32, String>,
    by_name: SoftCache<String, Arc<CollationRecipe>>,
    by_id: SoftCache<u32, Arc<CollationRecipe>>,
    next_id: AtomicU32,
    build_lock: Mutex<()>,
    builds: AtomicU64,
    binary: Arc<CollationRecipe>,
}

impl ComparatorCache {
    /// Creates a cache from configuration.
    pub fn new(config: &CollationConfig) -> Self {
        let cache = CacheConfig {
            capacity: config.cache_capacity,
            ttl: config.handle_ttl(),
        };
        Self::with_cache_config(config.mode, cache)
    }

    /// Creates a cache with an explicit soft-cache configuration.
    pub fn with_cache_config(mode: CollationMode, cache: CacheConfig) -> Self {
        Self {
            initial_mode: mode,
            mode: RwLock::new(mode),
            ids: DashMap::new(),
            names: DashMap::new(),
            by_name: SoftCache::new(cache.clone()),
            by_id: SoftCache::new(cache),
            next_id: AtomicU32::new(FIRST_COLLATION_ID),
            build_lock: Mutex::new(()),
            builds: AtomicU64::new(0),
            binary: Arc::new(CollationRecipe::binary()),
        }
    }

    /// Returns the current mode.
    pub fn mode(&self) -> CollationMode {
        *self.mode.read()
    }

    /// Switches mode and drops every cached recipe.
    pub fn set_mode(&self, mode: CollationMode) {
        let mut current = self.mode.write();
        let previous = *current;
        *current = mode;
        self.by_name.clear();
        self.by_id.clear();
        info!(from = %previous, to = %mode, "collation mode changed");
    }

    /// Restores the configured mode and drops every cached recipe.
    pub fn reset(&self) {
        self.set_mode(self.initial_mode);
    }

    /// Returns a collator for the scheme `name`.
    ///
    /// # Errors
    ///
    /// In strict mode an unknown scheme is an `UnknownCollation` error. Loose
    /// mode falls back to binary comparison, and disabled mode always
    /// compares binary.
    pub fn get(&self, name: &str) -> GroveResult<Collator> {
        let mode = self.mode();
        if mode == CollationMode::Disabled {
            return Ok(self.binary_collator(name));
        }

        let key = normalize(name);
        if let Some(recipe) = self.by_name.get(&key) {
            let id = self.ids.get(&key).map_or(BINARY_COLLATION_ID, |id| *id);
            return Ok(Collator::new(name, id, recipe));
        }

        let Some(scheme) = self.resolve(name, mode)? else {
            return Ok(self.binary_collator(name));
        };
        let id = self.assign_id(&key);
        let recipe = self.build(&key, id, &scheme);
        Ok(Collator::new(name, id, recipe))
    }

    /// Returns a collator for a scheme id handed out by [`id_for`](Self::id_for).
    pub fn get_by_id(&self, id: u32) -> GroveResult<Collator> {
        let mode = self.mode();
        if id == BINARY_COLLATION_ID || mode == CollationMode::Disabled {
            let name = self.names.get(&id).map_or_else(|| "ucs_binary".to_string(), |n| n.value().clone());
            return Ok(self.binary_collator(&name));
        }

        let Some(name) = self.names.get(&id).map(|n| n.value().clone()) else {
            return match mode {
                CollationMode::Strict => Err(GroveError::UnknownCollation {
                    scheme: format!("#{}", id),
                }),
                _ => {
                    warn!(id, "unknown collation id, comparing binary");
                    Ok(self.binary_collator("ucs_binary"))
                }
            };
        };

        if let Some(recipe) = self.by_id.get(&id) {
            return Ok(Collator::new(name, id, recipe));
        }
        let Some(scheme) = self.resolve(&name, mode)? else {
            return Ok(self.binary_collator(&name));
        };
        let recipe = self.build(&name, id, &scheme);
        Ok(Collator::new(name, id, recipe))
    }

    /// Returns the id of scheme `name`, assigning one on first use.
    ///
    /// Binary schemes have id 0.
    pub fn id_for(&self, name: &str) -> GroveResult<u32> {
        let mode = self.mode();
        match self.resolve(name, mode)? {
            Some(scheme) if !scheme.is_binary() => Ok(self.assign_id(&normalize(name))),
            _ => Ok(BINARY_COLLATION_ID),
        }
    }

    /// Returns hit and miss counters of the by-name table.
    pub fn cache_stats(&self) -> &CacheStats {
        self.by_name.stats()
    }

    /// Returns how many recipes have been built.
    pub fn recipes_built(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of recipes currently held.
    pub fn cached_recipes(&self) -> usize {
        self.by_name.len()
    }

    fn binary_collator(&self, name: &str) -> Collator {
        Collator::new(name, BINARY_COLLATION_ID, Arc::clone(&self.binary))
    }

    // Ok(None) means compare binary.
    fn resolve(&self, name: &str, mode: CollationMode) -> GroveResult<Option<CollationScheme>> {
        match CollationScheme::parse(name) {
            Some(scheme) if scheme.is_binary() => Ok(None),
            Some(scheme) => Ok(Some(scheme)),
            None if mode == CollationMode::Strict => Err(GroveError::UnknownCollation {
                scheme: name.to_string(),
            }),
            None => {
                warn!(scheme = name, "unknown collation scheme, comparing binary");
                Ok(None)
            }
        }
    }

    fn assign_id(&self, key: &str) -> u32 {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }
        let id = *self
            .ids
            .entry(key.to_string())
            .or_insert_with(|| self.next_id.fetch_add(1, Ordering::Relaxed));
        self.names.entry(id).or_insert_with(|| key.to_string());
        id
    }

    fn build(&self, key: &str, id: u32, scheme: &CollationScheme) -> Arc<CollationRecipe> {
        let _guard = self.build_lock.lock();
        if let Some(recipe) = self.by_name.get(key) {
            self.by_id.insert(id, Arc::clone(&recipe));
            return recipe;
        }

        let recipe = Arc::new(CollationRecipe::build(scheme));
        self.builds.fetch_add(1, Ordering::Relaxed);
        self.by_name.insert(key.to_string(), Arc::clone(&recipe));
        self.by_id.insert(id, Arc::clone(&recipe));
        debug!(scheme = key, id, "built collation recipe");
        recipe
    }
}

impl std::fmt::Debug for ComparatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparatorCache")
            .field("mode", &self.mode())
            .field("schemes", &self.ids.len())
            .field("cached", &self.by_name.len())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
