//! Benchmark runner for the map variants.
//!
//! Each run wires together one cache, a countdown latch, and a cancel
//! token, then drives a fixed pool of workers that hammer the cache with
//! random prime-factorization lookups. The driver blocks on the latch
//! rather than polling; if the workers overrun the configured deadline it
//! cancels the run and allows a short grace period for them to bail out.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use memo_cache::{CancelToken, CoarseMapCache, CountdownLatch, ShardedMapCache, StampedMapCache};
use rand::{thread_rng, Rng};
use scoped_threadpool::Pool;

use crate::models::{BenchConfig, CacheVariant, RunOutcome};
use crate::oracle;

/// How long cancelled workers get to notice the token and finish
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

// Use ahash for faster hashing with DashMap (same family our internal
// caches default to via hashbrown)
use ahash::RandomState as AHashRandomState;

/// Wrapper enum over all benchmarked cache implementations
///
/// The in-crate variants go through the `MemoCache` trait; DashMap is the
/// external comparison point and gets the same compute-if-absent shape via
/// its entry API.
enum VariantCache {
    Coarse(CoarseMapCache<u32, u32>),
    Sharded(ShardedMapCache<u32, u32>),
    Stamped(StampedMapCache<u32, u32>),
    Dash(DashMap<u32, u32, AHashRandomState>),
}

impl VariantCache {
    fn new(variant: CacheVariant) -> Self {
        match variant {
            CacheVariant::Coarse => VariantCache::Coarse(CoarseMapCache::new()),
            CacheVariant::Sharded => VariantCache::Sharded(ShardedMapCache::new()),
            CacheVariant::Stamped => VariantCache::Stamped(StampedMapCache::new()),
            CacheVariant::Dash => {
                VariantCache::Dash(DashMap::with_hasher(AHashRandomState::new()))
            }
        }
    }

    /// Memoized smallest-factor lookup; `None` means the computation was
    /// cancelled before an answer was published
    fn factor_of(&self, candidate: u32, cancel: &CancelToken) -> Option<u32> {
        match self {
            VariantCache::Coarse(cache) => {
                cache.compute_if_absent(candidate, |&n| oracle::smallest_factor(n, cancel))
            }
            VariantCache::Sharded(cache) => {
                cache.compute_if_absent(candidate, |&n| oracle::smallest_factor(n, cancel))
            }
            VariantCache::Stamped(cache) => {
                cache.compute_if_absent(candidate, |&n| oracle::smallest_factor(n, cancel))
            }
            VariantCache::Dash(map) => {
                if let Some(value) = map.get(&candidate) {
                    return Some(*value);
                }
                let computed = oracle::smallest_factor(candidate, cancel)?;
                // entry() arbitrates the publish race; the first value wins.
                Some(*map.entry(candidate).or_insert(computed))
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            VariantCache::Coarse(cache) => cache.len(),
            VariantCache::Sharded(cache) => cache.len(),
            VariantCache::Stamped(cache) => cache.len(),
            VariantCache::Dash(map) => map.len(),
        }
    }

    fn snapshot(&self) -> Vec<(u32, u32)> {
        match self {
            VariantCache::Coarse(cache) => cache.snapshot(),
            VariantCache::Sharded(cache) => cache.snapshot(),
            VariantCache::Stamped(cache) => cache.snapshot(),
            VariantCache::Dash(map) => {
                let mut entries: Vec<(u32, u32)> =
                    map.iter().map(|entry| (*entry.key(), *entry.value())).collect();
                entries.sort_by_key(|&(key, _)| key);
                entries
            }
        }
    }
}

/// Drives benchmark runs against a shared worker pool
pub struct BenchmarkRunner<'a> {
    config: &'a BenchConfig,
    pool: &'a mut Pool,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(config: &'a BenchConfig, pool: &'a mut Pool) -> Self {
        Self { config, pool }
    }

    /// Runs the full workload against one variant and returns its outcome
    pub fn run(&mut self, variant: CacheVariant) -> RunOutcome {
        let cache = VariantCache::new(variant);
        let latch = Arc::new(CountdownLatch::new(self.config.threads));
        let token = CancelToken::new();
        let config = self.config;

        let mut aborted = false;
        self.pool.scoped(|scope| {
            for worker_id in 0..config.threads {
                let cache = &cache;
                let latch = Arc::clone(&latch);
                let token = token.clone();
                scope.execute(move || {
                    run_worker(worker_id, cache, config, &token);
                    latch.count_down();
                });
            }

            if !latch.wait_for(config.timeout) {
                eprintln!(
                    "{variant} run exceeded {:?}; cancelling workers",
                    config.timeout
                );
                token.cancel();
                if !latch.wait_for(SHUTDOWN_GRACE) {
                    eprintln!("{variant} workers did not stop within the grace period");
                }
                aborted = true;
            }
        });

        RunOutcome {
            variant,
            entries: cache.len(),
            aborted,
            snapshot: cache.snapshot(),
        }
    }
}

/// One worker's share of the workload: `iterations` random candidates in
/// `[1, iterations]`, each resolved through the shared cache
fn run_worker(worker_id: usize, cache: &VariantCache, config: &BenchConfig, token: &CancelToken) {
    let mut rng = thread_rng();
    for _ in 0..config.iterations {
        if token.is_cancelled() {
            return;
        }
        let candidate = rng.gen_range(1..=config.iterations);
        match cache.factor_of(candidate, token) {
            Some(0) if config.verbose => {
                println!("[worker {worker_id}] {candidate} is prime");
            }
            Some(factor) if config.verbose => {
                println!("[worker {worker_id}] {candidate} has factor {factor}");
            }
            Some(_) => {}
            // Cancelled mid-computation; nothing was published.
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(iterations: u32, threads: usize) -> BenchConfig {
        BenchConfig {
            iterations,
            threads,
            verbose: false,
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_run_fills_cache_within_candidate_range() {
        let config = quiet_config(500, 4);
        let mut pool = Pool::new(4);
        let mut runner = BenchmarkRunner::new(&config, &mut pool);

        for variant in CacheVariant::all() {
            let outcome = runner.run(variant);
            assert!(!outcome.aborted, "{variant} run should finish in time");
            assert!(outcome.entries > 0);
            assert!(outcome.entries <= 500);
            assert_eq!(outcome.snapshot.len(), outcome.entries);
            // Snapshot keys stay inside the candidate range, in order.
            let mut last = 0;
            for &(key, value) in &outcome.snapshot {
                assert!((1..=500).contains(&key));
                assert!(key > last);
                last = key;
                let expected = oracle::smallest_factor(key, &CancelToken::new());
                assert_eq!(Some(value), expected);
            }
        }
    }

    #[test]
    fn test_cancelled_run_publishes_only_complete_results() {
        let config = quiet_config(200, 2);
        let cache = VariantCache::new(CacheVariant::Stamped);
        let token = CancelToken::new();
        token.cancel();

        // Workers that start cancelled bail out without publishing.
        run_worker(0, &cache, &config, &token);
        assert_eq!(cache.len(), 0);
    }
}
