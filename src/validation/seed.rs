//! Per-trial RNG seeding.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Counter-based seed derivation using SplitMix64.
///
/// Stateless, so trial `k` gets the same stream whether trials run serially or
/// on any number of worker threads.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// RNG for trial `trial` of a run seeded with `base_seed`.
pub fn trial_rng(base_seed: u64, trial: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(base_seed, trial as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_counter_seeds_are_distinct_and_stable() {
        let seeds: Vec<u64> = (0..1000).map(|i| counter_rng_seed(42, i)).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), seeds.len());
        assert_eq!(counter_rng_seed(42, 17), seeds[17]);
    }

    #[test]
    fn test_trial_rng_reproducible() {
        let a: u64 = trial_rng(7, 3).random();
        let b: u64 = trial_rng(7, 3).random();
        let c: u64 = trial_rng(7, 4).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
