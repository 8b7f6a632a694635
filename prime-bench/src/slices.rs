//! Post-run presentation of the memoized results.
//!
//! The snapshot is re-ordered by smallest factor (primes first, since their
//! factor is recorded as 0) and then split into the prime prefix and the
//! composite suffix.

/// Stably sorts entries by factor; key order is preserved within equal
/// factors because the input snapshot is already key-ordered
pub fn sort_by_factor(mut entries: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    entries.sort_by_key(|&(_, factor)| factor);
    entries
}

/// The leading run of primes from a factor-sorted sequence, as keys
pub fn prime_prefix(sorted: &[(u32, u32)]) -> Vec<u32> {
    sorted
        .iter()
        .take_while(|&&(_, factor)| factor == 0)
        .map(|&(candidate, _)| candidate)
        .collect()
}

/// Everything after the leading run of primes, as (candidate, factor) pairs
pub fn non_prime_suffix(sorted: &[(u32, u32)]) -> Vec<(u32, u32)> {
    sorted
        .iter()
        .skip_while(|&&(_, factor)| factor == 0)
        .copied()
        .collect()
}
