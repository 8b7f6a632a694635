//! Optimistic-read / exclusive-write lock with a version stamp.
//!
//! A [`StampedLock`] wraps a value in a reader/writer lock and pairs it with
//! a monotonically increasing version counter:
//!
//! - the version is **even** while no writer is inside the exclusive
//!   section, **odd** while one is;
//! - entering the exclusive section bumps the version to odd, leaving it
//!   bumps it back to even;
//! - a stamp taken before a write therefore never validates after that
//!   write completes.
//!
//! # Optimistic protocol
//!
//! ```text
//! let stamp = lock.optimistic_read();          // cheap: one atomic load
//! ... read through try_read() ...              // never waits for a writer
//! if lock.validate(stamp) { /* no writer interleaved, trust the read */ }
//! else                    { /* fall back to lock.read() and re-read */ }
//! ```
//!
//! Readers never block other readers: shared access goes through the
//! underlying `parking_lot::RwLock` read side, and the optimistic path uses
//! a non-blocking `try_read` so it never waits on a writer either; on
//! conflict it reports a stale stamp and the caller retries pessimistically.
//!
//! # Lock protocol violations
//!
//! The guard enforces stamp parity on release with `debug_assert!`: an
//! imbalanced acquire/release is a programming error, fatal in debug
//! builds rather than a recoverable runtime condition.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{fence, AtomicU64, Ordering};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reader/writer lock with an optimistic version stamp.
///
/// See the [module documentation](self) for the protocol.
pub struct StampedLock<T> {
    /// Even while quiescent, odd while a writer holds the exclusive section.
    version: AtomicU64,
    data: RwLock<T>,
}

impl<T> StampedLock<T> {
    /// Creates a new lock wrapping `value`, with the version at zero.
    pub fn new(value: T) -> Self {
        Self {
            version: AtomicU64::new(0),
            data: RwLock::new(value),
        }
    }

    /// Acquires an optimistic stamp.
    ///
    /// The stamp is only a marker; it grants no access on its own. An odd
    /// stamp means a writer was inside the exclusive section at the time of
    /// the call and will never validate.
    #[inline]
    pub fn optimistic_read(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Returns `true` if no writer has entered the exclusive section since
    /// `stamp` was acquired.
    ///
    /// A `false` result means a write could have interleaved with whatever
    /// the caller read after taking the stamp; the read must be repeated
    /// under [`read`](Self::read).
    #[inline]
    pub fn validate(&self, stamp: u64) -> bool {
        // Order the caller's data reads before the version re-check.
        fence(Ordering::Acquire);
        stamp & 1 == 0 && self.version.load(Ordering::Relaxed) == stamp
    }

    /// Attempts shared access without blocking.
    ///
    /// Returns `None` if a writer currently holds the exclusive section.
    /// This is the access path of an optimistic read attempt.
    #[inline]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.data.try_read()
    }

    /// Acquires shared access, blocking until any writer releases.
    ///
    /// The pessimistic fallback for a failed optimistic read.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read()
    }

    /// Acquires exclusive access, bumping the version stamp.
    ///
    /// While the returned guard is alive the version is odd and every
    /// concurrently acquired stamp fails validation. Dropping the guard
    /// bumps the version again, so stamps taken before the write never
    /// validate after it.
    pub fn write(&self) -> StampedWriteGuard<'_, T> {
        let guard = self.data.write();
        let prev = self.version.fetch_add(1, Ordering::AcqRel);
        debug_assert!(prev & 1 == 0, "writer entered with a writer-active stamp");
        StampedWriteGuard {
            guard,
            version: &self.version,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StampedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampedLock")
            .field("version", &self.version.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Exclusive access to the data of a [`StampedLock`].
///
/// Dropping the guard releases the write lock and returns the version to an
/// even (quiescent) value.
pub struct StampedWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
    version: &'a AtomicU64,
}

impl<T> Deref for StampedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for StampedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for StampedWriteGuard<'_, T> {
    fn drop(&mut self) {
        let prev = self.version.fetch_add(1, Ordering::Release);
        debug_assert!(prev & 1 == 1, "write stamp released twice");
    }
}

impl<T: fmt::Debug> fmt::Debug for StampedWriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StampedWriteGuard")
            .field("data", &*self.guard)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fresh_stamp_validates() {
        let lock = StampedLock::new(0u32);
        let stamp = lock.optimistic_read();
        assert!(lock.validate(stamp));
    }

    #[test]
    fn test_write_invalidates_earlier_stamp() {
        let lock = StampedLock::new(0u32);
        let stamp = lock.optimistic_read();
        {
            let mut guard = lock.write();
            *guard = 7;
        }
        assert!(!lock.validate(stamp));

        // A stamp taken after the write validates again.
        let fresh = lock.optimistic_read();
        assert!(lock.validate(fresh));
        assert_eq!(*lock.read(), 7);
    }

    #[test]
    fn test_stamp_is_odd_while_writer_active() {
        let lock = StampedLock::new(0u32);
        let guard = lock.write();
        let stamp = lock.optimistic_read();
        assert_eq!(stamp & 1, 1);
        assert!(!lock.validate(stamp));
        drop(guard);
    }

    #[test]
    fn test_try_read_fails_under_writer() {
        let lock = StampedLock::new(0u32);
        let guard = lock.write();
        assert!(lock.try_read().is_none());
        drop(guard);
        assert!(lock.try_read().is_some());
    }

    #[test]
    fn test_readers_share_access() {
        let lock = StampedLock::new(5u32);
        let a = lock.read();
        let b = lock.read();
        assert_eq!(*a, 5);
        assert_eq!(*b, 5);
    }

    #[test]
    fn test_concurrent_writers_keep_version_even_at_rest() {
        let lock = Arc::new(StampedLock::new(0u64));
        let mut handles = vec![];
        for _ in 0..4 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let mut guard = lock.write();
                    *guard += 1;
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let stamp = lock.optimistic_read();
        assert_eq!(stamp & 1, 0, "version must be even once writers are gone");
        assert!(lock.validate(stamp));
        assert_eq!(*lock.read(), 4000);
    }
}
