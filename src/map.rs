//! The contract shared by every map variant.
//!
//! A [`MemoCache`] is a concurrent, grow-only memoization map: keys are
//! published once and never removed or updated within the cache's lifetime.
//! The benchmark harness drives all variants exclusively through this trait,
//! so it deliberately exposes nothing beyond `get`, `compute_if_absent`,
//! and `snapshot`: no removal, no eviction, no capacity.

use core::hash::Hash;

/// A thread-safe memoization map with an atomic compute-if-absent operation.
///
/// # Contract
///
/// For any number of concurrent callers:
///
/// - [`get`](Self::get) never observes a torn or partially written value;
/// - [`compute_if_absent`](Self::compute_if_absent) on a present key returns
///   the stored value without invoking the factory;
/// - on an absent key, at most one computed value is durably published, and
///   every racing caller returns that same value;
/// - a factory returning `None` models an abandoned computation: nothing is
///   published and the call returns `None`. The key stays absent (or holds
///   whatever a racing caller successfully published).
///
/// Implementations may run racing factories redundantly and arbitrate at
/// publish time, or serialize the factory under a lock; both satisfy the
/// contract because factories are expected to be pure functions of the key.
///
/// # Snapshots
///
/// [`snapshot`](Self::snapshot) is a point-in-time copy ordered by key. It
/// is intended for post-run inspection, after all writers have finished.
pub trait MemoCache<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Clone,
{
    /// Returns a copy of the value stored for `key`, if present.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns the value for `key`, computing and publishing it via
    /// `factory` if absent.
    ///
    /// Returns `None` only when the key was absent and the factory abandoned
    /// its computation (returned `None`).
    fn compute_if_absent<F>(&self, key: K, factory: F) -> Option<V>
    where
        F: FnOnce(&K) -> Option<V>;

    /// Returns a point-in-time copy of all entries, ordered by key.
    fn snapshot(&self) -> Vec<(K, V)>;

    /// Returns the number of published entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entry has been published yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
