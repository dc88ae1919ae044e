//! Bounded exact-match cache for per-policy results
//!
//! Lookups, promotion and insertion all happen under one mutex, so a hit can
//! never be evicted between the membership check and the read. Computation
//! runs outside the lock: two callers missing on the same key may both
//! compute, and the first to publish wins. Eviction is least-recently-used.

use crate::error::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Default number of retained entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

struct Slot<V> {
    value: V,
    last_used: u64,
}

struct Inner<K, V> {
    entries: HashMap<K, Slot<V>>,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

/// Thread-safe LRU cache keyed by exact (structural) equality.
pub struct PolicyCache<K, V> {
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> PolicyCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        PolicyCache {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner { entries: HashMap::new(), clock: 0 }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        // Entries are only replaced whole, so a poisoned map is still consistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read and promote an entry.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        let now = inner.tick();
        inner.entries.get_mut(key).map(|slot| {
            slot.last_used = now;
            slot.value.clone()
        })
    }

    /// Insert `value` unless `key` is already present, in which case the
    /// published value is kept and returned.
    pub fn insert_or_get(&self, key: K, value: V) -> V {
        let mut inner = self.lock();
        let now = inner.tick();
        if let Some(slot) = inner.entries.get_mut(&key) {
            slot.last_used = now;
            return slot.value.clone();
        }
        if inner.entries.len() >= self.capacity {
            inner.evict_least_recent();
            debug!(capacity = self.capacity, "evicted least recently used entry");
        }
        inner.entries.insert(key, Slot { value: value.clone(), last_used: now });
        value
    }

    /// Return the cached value for `key`, computing and publishing it on a miss.
    pub fn get_or_try_compute<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            info!("policy cache hit");
            return Ok(value);
        }
        info!("policy cache miss, computing");
        let value = compute()?;
        Ok(self.insert_or_get(key, value))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for PolicyCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_miss_then_hit() {
        let cache: PolicyCache<&str, u32> = PolicyCache::new(2);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let v = cache
                .get_or_try_compute("a", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .unwrap();
            assert_eq!(v, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capacity_is_respected_with_lru_eviction() {
        let cache = PolicyCache::new(2);
        cache.insert_or_get(1, "one");
        cache.insert_or_get(2, "two");
        // Touch 1 so that 2 becomes least recently used
        assert_eq!(cache.get(&1), Some("one"));
        cache.insert_or_get(3, "three");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn test_first_publisher_wins() {
        let cache = PolicyCache::new(4);
        assert_eq!(cache.insert_or_get("k", 1), 1);
        assert_eq!(cache.insert_or_get("k", 2), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: PolicyCache<u8, u8> = PolicyCache::new(4);
        let err = cache.get_or_try_compute(0, || Err(EngineError::EmptyMixture)).unwrap_err();
        assert_eq!(err, EngineError::EmptyMixture);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        let cache: PolicyCache<u8, u8> = PolicyCache::default();
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        for k in 0..20 {
            cache.insert_or_get(k, k);
        }
        assert_eq!(cache.len(), DEFAULT_CACHE_CAPACITY);
        assert!(cache.contains(&19));
        assert!(!cache.contains(&0));
    }

    #[test]
    fn test_concurrent_callers_agree() {
        let cache: Arc<PolicyCache<u32, u64>> = Arc::new(PolicyCache::new(3));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_try_compute(42, || Ok(1000 + i)).unwrap())
            })
            .collect();
        let results: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let published = cache.get(&42).unwrap();
        // Racers that computed redundantly still return the published value
        assert!((1000..1008).contains(&published));
        assert!(results.iter().all(|&r| r == published));
        assert_eq!(cache.len(), 1);
    }
}
