// Data models for the memoization benchmark

use std::fmt;
use std::time::Duration;

/// Map strategies available for benchmarking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheVariant {
    /// Single global mutex around one map
    Coarse,
    /// Lock-striped map, one mutex per segment
    Sharded,
    /// Optimistic-read map built on a version-stamped lock
    Stamped,
    /// DashMap (external crate for comparison)
    Dash,
}

impl CacheVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheVariant::Coarse => "Coarse",
            CacheVariant::Sharded => "Sharded",
            CacheVariant::Stamped => "Stamped",
            CacheVariant::Dash => "DashMap",
        }
    }

    /// Get all available variants, in the order they are benchmarked
    pub fn all() -> Vec<CacheVariant> {
        vec![
            CacheVariant::Coarse,
            CacheVariant::Sharded,
            CacheVariant::Stamped,
            CacheVariant::Dash,
        ]
    }

    /// Parse a variant name as given on the command line
    pub fn parse(name: &str) -> Option<CacheVariant> {
        match name.to_lowercase().as_str() {
            "coarse" => Some(CacheVariant::Coarse),
            "sharded" => Some(CacheVariant::Sharded),
            "stamped" => Some(CacheVariant::Stamped),
            "dash" | "dashmap" => Some(CacheVariant::Dash),
            _ => None,
        }
    }
}

impl fmt::Display for CacheVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one benchmark session, shared by every variant run
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of compute iterations per worker; also the top of the random
    /// candidate range, so the hit rate rises as a run progresses
    pub iterations: u32,
    /// Number of worker threads
    pub threads: usize,
    /// Print per-worker progress
    pub verbose: bool,
    /// How long to wait for the workers before cancelling a run
    pub timeout: Duration,
}

/// Outcome of benchmarking a single variant
#[derive(Debug)]
pub struct RunOutcome {
    pub variant: CacheVariant,
    /// Entries published by the end of the run
    pub entries: usize,
    /// True when the run was cancelled after overrunning its deadline
    pub aborted: bool,
    /// Post-run copy of the map, ordered by key
    pub snapshot: Vec<(u32, u32)>,
}
