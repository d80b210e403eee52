//! Seeded train/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("test fraction must be in [0, 1), got {0}")]
    InvalidFraction(f64),
}

/// Shuffle with a seeded RNG and split into `(train, test)`.
///
/// The test set is the first `floor(n * test_fraction)` shuffled records and
/// the train set is the rest, so the two partition the input.
pub fn train_test_split<T: Clone>(
    records: &[T],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>), SplitError> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(SplitError::InvalidFraction(test_fraction));
    }

    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = (records.len() as f64 * test_fraction).floor() as usize;
    let (test_idx, train_idx) = indices.split_at(n_test);
    let pick = |idx: &[usize]| idx.iter().map(|&i| records[i].clone()).collect::<Vec<_>>();

    Ok((pick(train_idx), pick(test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sizes_follow_floor() {
        let data: Vec<u32> = (0..10).collect();
        let (train, test) = train_test_split(&data, 0.3, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);

        let (train, test) = train_test_split(&data, 0.0, 42).unwrap();
        assert!(test.is_empty());
        assert_eq!(train.len(), 10);
    }

    #[test]
    fn same_seed_same_split() {
        let data: Vec<u32> = (0..100).collect();
        let a = train_test_split(&data, 0.25, 7).unwrap();
        let b = train_test_split(&data, 0.25, 7).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(&data, 0.25, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_invalid_fraction() {
        let data = [1, 2, 3];
        for f in [1.0, -0.1, f64::NAN, 2.0] {
            assert!(train_test_split(&data, f, 0).is_err());
        }
    }

    #[test]
    fn empty_input() {
        let data: Vec<u8> = Vec::new();
        let (train, test) = train_test_split(&data, 0.5, 1).unwrap();
        assert!(train.is_empty() && test.is_empty());
    }

    proptest! {
        #[test]
        fn split_partitions_input(n in 0usize..200, f in 0.0f64..0.99, seed in any::<u64>()) {
            let data: Vec<usize> = (0..n).collect();
            let (train, test) = train_test_split(&data, f, seed).unwrap();
            prop_assert_eq!(test.len(), (n as f64 * f).floor() as usize);

            let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, data);
        }
    }
}
