//! Prime-factorization oracle used as the memoized computation.
//!
//! [`smallest_factor`] is a deliberately naive linear search: the point of
//! the benchmark is that recomputation is expensive enough for memoization
//! to matter. The oracle polls a [`CancelToken`] each step and abandons the
//! computation when a run is cancelled, so a half-finished answer is never
//! reported as a result.

use memo_cache::CancelToken;

/// Returns `Some(0)` if `candidate` is prime, or `Some(f)` with the smallest
/// factor in `2..=candidate/2` otherwise.
///
/// Candidates of 3 or below are reported prime by convention, matching the
/// workload's candidate range starting at 1.
///
/// Returns `None` if `cancel` fires mid-computation; a partial search says
/// nothing about primality and must not be published.
pub fn smallest_factor(candidate: u32, cancel: &CancelToken) -> Option<u32> {
    if candidate > 3 {
        for factor in 2..=candidate / 2 {
            if cancel.is_cancelled() {
                return None;
            }
            if candidate % factor == 0 {
                return Some(factor);
            }
        }
    }
    Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_candidates_are_prime_by_convention() {
        let token = CancelToken::new();
        assert_eq!(smallest_factor(1, &token), Some(0));
        assert_eq!(smallest_factor(2, &token), Some(0));
        assert_eq!(smallest_factor(3, &token), Some(0));
    }

    #[test]
    fn test_composites_report_smallest_factor() {
        let token = CancelToken::new();
        assert_eq!(smallest_factor(4, &token), Some(2));
        assert_eq!(smallest_factor(9, &token), Some(3));
        assert_eq!(smallest_factor(15, &token), Some(3));
        assert_eq!(smallest_factor(49, &token), Some(7));
    }

    #[test]
    fn test_primes_report_zero() {
        let token = CancelToken::new();
        for prime in [5u32, 7, 11, 13, 17, 97, 7919] {
            assert_eq!(smallest_factor(prime, &token), Some(0));
        }
    }

    #[test]
    fn test_cancelled_search_is_abandoned() {
        let token = CancelToken::new();
        token.cancel();
        // Large enough to enter the loop and hit the cancellation check.
        assert_eq!(smallest_factor(1_000_003, &token), None);
        // Small candidates never enter the loop and still resolve.
        assert_eq!(smallest_factor(2, &token), Some(0));
    }
}
