//! Row (bagging) and column (feature) sampling.
//!
//! Both samplers draw without replacement with a partial Fisher-Yates shuffle
//! seeded per boosting round, and return sorted indices for cache-friendly
//! access. A fraction of 1.0 disables sampling.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const ROW_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;
const COL_STREAM: u64 = 0x517C_C1B7_2722_0A95;

/// Seed for one sampling stream in one round.
#[inline]
fn round_seed(seed: u64, round: usize, stream: u64) -> u64 {
    seed ^ (round as u64 + 1).wrapping_mul(stream)
}

/// Size of a fractional sample: `floor(n * fraction)` in `f32`, at least 1.
///
/// The product stays in `f32` so a fraction such as 0.8 is not widened to
/// 0.800000011920929 and pushed past the next integer.
#[inline]
fn sample_size(n: usize, fraction: f32) -> usize {
    ((n as f32 * fraction) as usize).clamp(1, n.max(1))
}

// ============================================================================
// RowSampler
// ============================================================================

/// Per-round row subsampling (bagging).
#[derive(Debug, Clone)]
pub struct RowSampler {
    n_rows: usize,
    fraction: f32,
    seed: u64,
}

impl RowSampler {
    pub fn new(n_rows: usize, fraction: f32, seed: u64) -> Self {
        debug_assert!(fraction > 0.0 && fraction <= 1.0);
        Self {
            n_rows,
            fraction,
            seed,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.fraction < 1.0 && self.n_rows > 1
    }

    /// Rows used to grow the tree of `round`, or `None` for all rows.
    pub fn sample(&self, round: usize) -> Option<Vec<u32>> {
        if !self.is_enabled() {
            return None;
        }
        let k = sample_size(self.n_rows, self.fraction);
        Some(sample_without_replacement(
            self.n_rows,
            k,
            round_seed(self.seed, round, ROW_STREAM),
        ))
    }
}

// ============================================================================
// ColSampler
// ============================================================================

/// Per-tree feature subsampling.
#[derive(Debug, Clone)]
pub struct ColSampler {
    n_features: usize,
    fraction: f32,
    seed: u64,
}

impl ColSampler {
    pub fn new(n_features: usize, fraction: f32, seed: u64) -> Self {
        debug_assert!(fraction > 0.0 && fraction <= 1.0);
        Self {
            n_features,
            fraction,
            seed,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.fraction < 1.0 && self.n_features > 1
    }

    /// Features the tree of `round` may split on, sorted ascending.
    pub fn sample_tree(&self, round: usize) -> Vec<u32> {
        if !self.is_enabled() {
            return (0..self.n_features as u32).collect();
        }
        let k = sample_size(self.n_features, self.fraction);
        sample_without_replacement(self.n_features, k, round_seed(self.seed, round, COL_STREAM))
    }
}

/// Sample `k` items from `0..n` without replacement, sorted.
pub(crate) fn sample_without_replacement(n: usize, k: usize, seed: u64) -> Vec<u32> {
    let k = k.min(n);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indices: Vec<u32> = (0..n as u32).collect();

    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }

    indices.truncate(k);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_row_sampler_returns_none() {
        let sampler = RowSampler::new(100, 1.0, 42);
        assert!(!sampler.is_enabled());
        assert!(sampler.sample(0).is_none());
    }

    #[test]
    fn row_sample_size_and_order() {
        let sampler = RowSampler::new(100, 0.8, 42);
        let rows = sampler.sample(3).unwrap();
        assert_eq!(rows.len(), 80);
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
        assert!(rows.iter().all(|&r| r < 100));
    }

    #[test]
    fn rounds_draw_different_rows_reproducibly() {
        let sampler = RowSampler::new(200, 0.5, 42);
        assert_eq!(sampler.sample(1), sampler.sample(1));
        assert_ne!(sampler.sample(1), sampler.sample(2));
    }

    #[test]
    fn column_sample_keeps_at_least_one() {
        let sampler = ColSampler::new(10, 0.8, 7);
        let features = sampler.sample_tree(0);
        assert_eq!(features.len(), 8);

        let small = ColSampler::new(3, 0.1, 7);
        assert_eq!(small.sample_tree(0).len(), 1);
    }

    #[test]
    fn default_fractions_are_exact() {
        assert_eq!(sample_size(100, 0.8), 80);
        assert_eq!(sample_size(40, 0.8), 32);
        assert_eq!(sample_size(10, 0.7), 7);
        assert_eq!(sample_size(50, 0.9), 45);
        assert_eq!(RowSampler::new(100, 0.8, 42).sample(0).map(|r| r.len()), Some(80));
        assert_eq!(ColSampler::new(40, 0.8, 42).sample_tree(0).len(), 32);
    }

    #[test]
    fn full_column_fraction_keeps_all() {
        let sampler = ColSampler::new(4, 1.0, 7);
        assert_eq!(sampler.sample_tree(5), vec![0, 1, 2, 3]);
    }
}
