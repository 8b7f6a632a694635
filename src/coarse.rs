//! Memoization map guarded by a single mutex.
//!
//! Every operation, lookups included, takes the one lock, and
//! [`compute_if_absent`](CoarseMapCache::compute_if_absent) holds it across
//! the factory call, so the whole cache is a serial section. This is the
//! deliberately pessimal baseline: correct by construction, worst expected
//! throughput under read-heavy load.

use crate::map::MemoCache;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;
use std::collections::HashMap;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe memoization map with a single global lock.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Ord + Clone`.
/// - `V`: Value type. Must implement `Clone`.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
pub struct CoarseMapCache<K, V, S = DefaultHashBuilder> {
    map: Mutex<HashMap<K, V, S>>,
}

impl<K, V> CoarseMapCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    /// Creates an empty cache with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> Default for CoarseMapCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> CoarseMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Creates an empty cache with a custom hash builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            map: Mutex::new(HashMap::with_hasher(hash_builder)),
        }
    }

    /// Returns a copy of the value stored for `key`, if present.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.lock().get(key).cloned()
    }

    /// Returns the value for `key`, computing and publishing it if absent.
    ///
    /// The lock is held across the factory call: computation for a missing
    /// key is fully serialized, so racing callers never compute redundantly.
    pub fn compute_if_absent<F>(&self, key: K, factory: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        let mut map = self.map.lock();
        if let Some(existing) = map.get(&key) {
            return Some(existing.clone());
        }
        let computed = factory(&key)?;
        map.insert(key, computed.clone());
        Some(computed)
    }

    /// Returns a point-in-time copy of all entries, ordered by key.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let map = self.map.lock();
        let mut entries: Vec<(K, V)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        drop(map);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Returns the number of published entries.
    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    /// Returns `true` if no entry has been published yet.
    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

impl<K, V, S> MemoCache<K, V> for CoarseMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn get(&self, key: &K) -> Option<V> {
        CoarseMapCache::get(self, key)
    }

    fn compute_if_absent<F>(&self, key: K, factory: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        CoarseMapCache::compute_if_absent(self, key, factory)
    }

    fn snapshot(&self) -> Vec<(K, V)> {
        CoarseMapCache::snapshot(self)
    }

    fn len(&self) -> usize {
        CoarseMapCache::len(self)
    }
}

impl<K, V, S> fmt::Debug for CoarseMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoarseMapCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let cache: CoarseMapCache<u32, u32> = CoarseMapCache::new();
        assert!(cache.is_empty());

        assert_eq!(cache.compute_if_absent(2, |_| Some(0)), Some(0));
        assert_eq!(cache.compute_if_absent(4, |_| Some(2)), Some(2));

        assert_eq!(cache.get(&2), Some(0));
        assert_eq!(cache.get(&4), Some(2));
        assert_eq!(cache.get(&5), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_present_key_keeps_first_value() {
        let cache: CoarseMapCache<u32, u32> = CoarseMapCache::new();
        cache.compute_if_absent(6, |_| Some(2));
        // Redundant computes are idempotent: the stored value survives.
        assert_eq!(cache.compute_if_absent(6, |_| Some(3)), Some(2));
        assert_eq!(cache.get(&6), Some(2));
    }

    #[test]
    fn test_abandoned_factory_publishes_nothing() {
        let cache: CoarseMapCache<u32, u32> = CoarseMapCache::new();
        assert_eq!(cache.compute_if_absent(11, |_| None), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_snapshot_ordering() {
        let cache: CoarseMapCache<u32, u32> = CoarseMapCache::new();
        cache.compute_if_absent(3, |_| Some(0));
        cache.compute_if_absent(1, |_| Some(0));
        cache.compute_if_absent(2, |_| Some(0));
        assert_eq!(cache.snapshot(), vec![(1, 0), (2, 0), (3, 0)]);
    }
}
