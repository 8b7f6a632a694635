//! Memoization map guarded by a [`StampedLock`].
//!
//! This is the optimistic variant: lookups take a version stamp, read
//! through a non-blocking shared guard, and validate the stamp afterwards,
//! so reads never block other reads and never wait on a writer unless a
//! write actually interleaved. Only the publish step of
//! [`compute_if_absent`](StampedMapCache::compute_if_absent) enters the
//! exclusive section.
//!
//! # Compute-if-absent, step by step
//!
//! 1. Validated optimistic lookup; a present key returns immediately and
//!    the factory is never invoked.
//! 2. On a miss, the factory runs **outside any lock**. Racing callers on
//!    the same missing key may therefore compute redundantly; that burns
//!    CPU but cannot affect correctness because factories are pure.
//! 3. Publish takes the exclusive write section and re-checks presence:
//!    if another caller published while this one computed, the freshly
//!    computed value is discarded and the winner's value is returned.
//!
//! A factory that abandons its computation (returns `None`) publishes
//! nothing; the exclusive section is never entered for it.
//!
//! # Example
//!
//! ```rust
//! use memo_cache::{MemoCache, StampedMapCache};
//!
//! let cache: StampedMapCache<u32, u32> = StampedMapCache::new();
//! assert_eq!(cache.compute_if_absent(10, |&n| Some(n * 2)), Some(20));
//! assert_eq!(cache.get(&10), Some(20));
//! ```

use crate::map::MemoCache;
use crate::stamp::StampedLock;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A concurrent memoization map with optimistic reads.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Ord + Clone`.
/// - `V`: Value type. Must implement `Clone`.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Thread Safety
///
/// `StampedMapCache` is `Send + Sync` (given `Send` key/value types) and is
/// meant to be shared by reference or via `Arc` across worker threads.
pub struct StampedMapCache<K, V, S = DefaultHashBuilder> {
    inner: StampedLock<HashMap<K, V, S>>,
}

impl<K, V> StampedMapCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    /// Creates an empty cache with the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> Default for StampedMapCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> StampedMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Creates an empty cache with a custom hash builder.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            inner: StampedLock::new(HashMap::with_hasher(hash_builder)),
        }
    }

    /// Returns a copy of the value stored for `key`, if present.
    ///
    /// Optimistic fast path: stamp, non-blocking read, validate. Falls back
    /// to a blocking shared read only when a writer interleaved.
    pub fn get(&self, key: &K) -> Option<V> {
        let stamp = self.inner.optimistic_read();
        if stamp & 1 == 0 {
            if let Some(map) = self.inner.try_read() {
                let value = map.get(key).cloned();
                drop(map);
                if self.inner.validate(stamp) {
                    return value;
                }
            }
        }
        // A writer interleaved with the optimistic attempt; re-read under
        // the blocking shared lock.
        self.inner.read().get(key).cloned()
    }

    /// Returns the value for `key`, computing and publishing it if absent.
    ///
    /// The factory runs outside any lock; publishing re-checks presence
    /// under the exclusive section, so at most one computed value per key
    /// ever becomes durable. Racing callers all return the published value.
    ///
    /// Returns `None` only when the key was absent and the factory
    /// abandoned its computation.
    pub fn compute_if_absent<F>(&self, key: K, factory: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        if let Some(existing) = self.get(&key) {
            return Some(existing);
        }

        // Miss: compute without holding the lock. An abandoned computation
        // must never reach the map.
        let computed = factory(&key)?;

        let mut map = self.inner.write();
        if let Some(winner) = map.get(&key) {
            // Another caller published while we were computing; ours loses.
            return Some(winner.clone());
        }
        map.insert(key, computed.clone());
        Some(computed)
    }

    /// Returns a point-in-time copy of all entries, ordered by key.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let map = self.inner.read();
        let mut entries: Vec<(K, V)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        drop(map);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Returns the number of published entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if no entry has been published yet.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<K, V, S> MemoCache<K, V> for StampedMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn get(&self, key: &K) -> Option<V> {
        StampedMapCache::get(self, key)
    }

    fn compute_if_absent<F>(&self, key: K, factory: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>,
    {
        StampedMapCache::compute_if_absent(self, key, factory)
    }

    fn snapshot(&self) -> Vec<(K, V)> {
        StampedMapCache::snapshot(self)
    }

    fn len(&self) -> usize {
        StampedMapCache::len(self)
    }
}

impl<K, V, S> fmt::Debug for StampedMapCache<K, V, S>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampedMapCache")
            .field("len", &self.len())
            .finish()
    }
}
