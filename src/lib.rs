#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Which variant should I use?
//!
//! | Variant | `get` | `compute_if_absent` | Contention profile |
//! |---------|-------|---------------------|--------------------|
//! | [`CoarseMapCache`] | locks the map | serialized, factory under lock | everything contends |
//! | [`ShardedMapCache`] | locks one segment | atomic per segment | contends per hash segment |
//! | [`StampedMapCache`] | optimistic, lock-free vs. readers | publish-exclusive only | reads never block reads |
//!
//! ## The compute-if-absent contract
//!
//! All variants guarantee, for any number of concurrent callers:
//!
//! - a present key returns its stored value without invoking the factory;
//! - an absent key is published **at most once**: when callers race, one
//!   computed value becomes durable and every caller returns that value;
//! - a factory returning `None` (an abandoned computation) publishes
//!   nothing.
//!
//! The variants differ only in how much work they serialize to get there.
//! `StampedMapCache` lets racing callers run the factory redundantly and
//! arbitrates at publish time; the other two hold a lock across the factory
//! so the computation itself is serialized.
//!
//! ## Modules
//!
//! - [`map`]: the [`MemoCache`] contract shared by every variant
//! - [`stamp`]: the optimistic-read/exclusive-write [`StampedLock`]
//! - [`stamped`]: the stamped-lock map (the interesting one)
//! - [`coarse`]: the single-mutex baseline
//! - [`sharded`]: the lock-striped baseline
//! - [`latch`]: [`CountdownLatch`] exit barrier
//! - [`cancel`]: [`CancelToken`] for cooperative cancellation

/// The cache contract shared by all map variants.
///
/// Defines [`MemoCache`](map::MemoCache): `get`, atomic `compute_if_absent`,
/// and a key-ordered point-in-time `snapshot`.
pub mod map;

/// Optimistic-read / exclusive-write lock with a version stamp.
///
/// The reusable primitive underneath [`StampedMapCache`]: an opaque version
/// counter whose parity and value let a reader detect whether a writer
/// interleaved with its read.
pub mod stamp;

/// Map guarded by a [`StampedLock`](stamp::StampedLock).
///
/// Reads are optimistic and validated; only the publish step of
/// `compute_if_absent` takes the exclusive section.
pub mod stamped;

/// Map guarded by a single mutex.
///
/// The simplest possible thread-safe memoization map, kept as the
/// worst-case comparison point.
pub mod coarse;

/// Lock-striped map.
///
/// Partitions the key space across independently locked segments so
/// operations on different segments never contend.
pub mod sharded;

/// Countdown latch used as an exit barrier.
pub mod latch;

/// Cooperative cancellation token.
pub mod cancel;

// Re-export the main types
pub use cancel::CancelToken;
pub use coarse::CoarseMapCache;
pub use latch::CountdownLatch;
pub use map::MemoCache;
pub use sharded::ShardedMapCache;
pub use stamp::StampedLock;
pub use stamped::StampedMapCache;
