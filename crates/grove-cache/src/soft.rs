//! Soft cache: bounded by size and by time since last access.
//!
//! Entries are expected to be cheap to clone handles (usually `Arc`s) to
//! objects that are expensive to build but always rebuildable. A miss is
//! never an error; the caller rebuilds and re-inserts.
//!
//! Lookups go to a sharded `DashMap` and never take a cache-wide lock.
//! Capacity eviction removes the least recently used entry, preferring
//! entries that have already expired.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::stats::CacheStats;
use crate::CacheConfig;

struct SoftEntry<V> {
    value: V,
    /// Logical access clock value at last access.
    last_tick: AtomicU64,
    /// Nanoseconds since cache creation at last access.
    last_touch: AtomicU64,
}

impl<V> SoftEntry<V> {
    fn new(value: V, tick: u64, now: u64) -> Self {
        Self {
            value,
            last_tick: AtomicU64::new(tick),
            last_touch: AtomicU64::new(now),
        }
    }

    fn touch(&self, tick: u64, now: u64) {
        self.last_tick.store(tick, Ordering::Relaxed);
        self.last_touch.store(now, Ordering::Relaxed);
    }
}

/// A concurrent cache whose entries expire after a period without use.
pub struct SoftCache<K, V> {
    entries: DashMap<K, SoftEntry<V>>,
    capacity: usize,
    ttl: Option<Duration>,
    epoch: Instant,
    clock: AtomicU64,
    evict_lock: Mutex<()>,
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V: Clone> SoftCache<K, V> {
    /// Creates a cache from the given configuration.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity,
            ttl: config.ttl,
            epoch: Instant::now(),
            clock: AtomicU64::new(0),
            evict_lock: Mutex::new(()),
            stats: CacheStats::new(),
        }
    }

    /// Returns a live entry, refreshing its age.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.now();
        if let Some(entry) = self.entries.get(key) {
            if !self.is_expired(&entry, now) {
                entry.touch(self.tick(), now);
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
        } else {
            self.stats.record_miss();
            return None;
        }

        if self
            .entries
            .remove_if(key, |_, entry| self.is_expired(entry, now))
            .is_some()
        {
            self.stats.record_expiration();
        }
        self.stats.record_miss();
        None
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let entry = SoftEntry::new(value, self.tick(), self.now());
        let previous = self.entries.insert(key, entry).map(|old| old.value);
        self.stats.record_insert();

        if self.entries.len() > self.capacity {
            self.evict_over_capacity();
        }
        previous
    }

    /// Removes an entry.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Returns true if a live entry exists, without refreshing it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.now();
        self.entries
            .get(key)
            .map_or(false, |entry| !self.is_expired(&entry, now))
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = self.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before.saturating_sub(self.entries.len());
        for _ in 0..purged {
            self.stats.record_expiration();
        }
        purged
    }

    /// Returns the number of entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn evict_over_capacity(&self) {
        let _guard = self.evict_lock.lock();
        while self.entries.len() > self.capacity {
            let now = self.now();
            let victim = self
                .entries
                .iter()
                .min_by_key(|item| {
                    let entry = item.value();
                    (
                        !self.is_expired(entry, now),
                        entry.last_tick.load(Ordering::Relaxed),
                    )
                })
                .map(|item| item.key().clone());

            let Some(key) = victim else { break };
            if self.entries.remove(&key).is_some() {
                self.stats.record_eviction();
                trace!(len = self.entries.len(), "evicted least recently used entry");
            }
        }
    }

    fn is_expired(&self, entry: &SoftEntry<V>, now: u64) -> bool {
        match self.ttl {
            Some(ttl) => {
                let age = now.saturating_sub(entry.last_touch.load(Ordering::Relaxed));
                u128::from(age) > ttl.as_nanos()
            }
            None => false,
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for SoftCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn cache(capacity: usize) -> SoftCache<String, u32> {
        SoftCache::new(CacheConfig::with_capacity(capacity))
    }

    #[test]
    fn test_insert_and_get() {
        let cache = cache(4);
        assert!(cache.insert("a".to_string(), 1).is_none());
        assert_eq!(cache.insert("a".to_string(), 2), Some(1));

        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = cache(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        // "a" becomes the most recently used
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("c"));
        assert_eq!(cache.stats().evictions(), 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache: SoftCache<&str, u32> =
            SoftCache::new(CacheConfig::with_capacity(4).with_ttl(Duration::from_millis(20)));
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.stats().expirations(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_access_refreshes_ttl() {
        let cache: SoftCache<&str, u32> =
            SoftCache::new(CacheConfig::with_capacity(4).with_ttl(Duration::from_millis(200)));
        cache.insert("a", 1);
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(50));
            assert_eq!(cache.get(&"a"), Some(1));
        }
    }

    #[test]
    fn test_purge_expired() {
        let cache: SoftCache<u32, u32> =
            SoftCache::new(CacheConfig::with_capacity(8).with_ttl(Duration::from_millis(10)));
        for i in 0..5 {
            cache.insert(i, i);
        }
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.purge_expired(), 5);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let cache = cache(4);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.purge_expired(), 0);
        assert!(cache.ttl().is_none());
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = cache(4);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.remove("a"), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_debug_reports_size() {
        let cache = cache(4);
        cache.insert("a".to_string(), 1);
        let shown = format!("{:?}", cache);
        assert!(shown.starts_with("SoftCache"));
        assert!(shown.contains("len: 1"));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = cache(0);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(SoftCache::<u32, u32>::new(CacheConfig::with_capacity(16)));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200u32 {
                        let key = (i + t) % 32;
                        if cache.get(&key).is_none() {
                            cache.insert(key, key * 2);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 16);
        for key in 0..32u32 {
            if let Some(value) = cache.get(&key) {
                assert_eq!(value, key * 2);
            }
        }
    }
}
