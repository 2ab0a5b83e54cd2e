//! # Dataset Splitting
//!
//! Seeded shuffle-and-carve splits into train, validation and test sets.
//! Every item lands in exactly one part, and a fixed seed always yields the
//! same partition.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DoccatError, Result};

/// Split ratios and seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share of all items held out for testing.
    pub test_ratio: f64,
    /// Share of the remaining items held out for validation.
    pub validation_ratio: f64,
    /// Seed for the shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.15,
            validation_ratio: 0.1,
            seed: 1,
        }
    }
}

impl SplitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_ratio(mut self, ratio: f64) -> Self {
        self.test_ratio = ratio;
        self
    }

    pub fn with_validation_ratio(mut self, ratio: f64) -> Self {
        self.validation_ratio = ratio;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The three parts of a split dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplit<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
    pub test: Vec<T>,
}

impl<T> DatasetSplit<T> {
    /// Total number of items across all parts.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seeded permutation of `0..n` (Fisher-Yates).
fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        indices.swap(i, j);
    }
    indices
}

/// Split `items` into `(train, test)`.
///
/// The test part receives `ceil(test_ratio * n)` items. Both parts keep the
/// order of the seeded permutation.
pub fn train_test_split<T>(
    items: Vec<T>,
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(0.0..1.0).contains(&test_ratio) {
        return Err(DoccatError::InvalidSplit(test_ratio));
    }

    let n = items.len();
    let n_test = ((test_ratio * n as f64).ceil() as usize).min(n);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut test = Vec::with_capacity(n_test);
    let mut train = Vec::with_capacity(n - n_test);

    for (pos, idx) in permutation(n, seed).into_iter().enumerate() {
        // Each index appears once in the permutation.
        if let Some(item) = slots[idx].take() {
            if pos < n_test {
                test.push(item);
            } else {
                train.push(item);
            }
        }
    }

    if train.is_empty() && n > 0 {
        warn!(items = n, test_ratio, "split left the training part empty");
    }

    Ok((train, test))
}

/// Carve test off all items, then validation off the remainder.
pub fn split_dataset<T>(items: Vec<T>, config: &SplitConfig) -> Result<DatasetSplit<T>> {
    let (train_val, test) = train_test_split(items, config.test_ratio, config.seed)?;
    let (train, validation) = train_test_split(train_val, config.validation_ratio, config.seed)?;

    info!(
        train = train.len(),
        validation = validation.len(),
        test = test.len(),
        seed = config.seed,
        "split dataset"
    );

    Ok(DatasetSplit {
        train,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn permutation_is_complete() {
        let perm = permutation(50, 7);
        let unique: HashSet<_> = perm.iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(perm.iter().all(|&i| i < 50));
    }

    #[test]
    fn split_sizes_round_test_up() {
        let (train, test) = train_test_split((0..100).collect(), 0.15, 1).unwrap();
        assert_eq!(test.len(), 15);
        assert_eq!(train.len(), 85);

        let (train, test) = train_test_split((0..10).collect(), 0.15, 1).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_is_deterministic_for_seed() {
        let a = split_dataset((0..200).collect::<Vec<_>>(), &SplitConfig::default()).unwrap();
        let b = split_dataset((0..200).collect::<Vec<_>>(), &SplitConfig::default()).unwrap();
        assert_eq!(a, b);

        let c = split_dataset(
            (0..200).collect::<Vec<_>>(),
            &SplitConfig::default().with_seed(2),
        )
        .unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn split_partitions_every_item_once() {
        let split = split_dataset((0..137).collect::<Vec<u32>>(), &SplitConfig::default()).unwrap();
        assert_eq!(split.len(), 137);

        let mut all: Vec<u32> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..137).collect::<Vec<_>>());
    }

    #[test]
    fn zero_ratio_keeps_everything_in_train() {
        let (train, test) = train_test_split(vec!['a', 'b', 'c'], 0.0, 1).unwrap();
        assert!(test.is_empty());
        assert_eq!(train.len(), 3);
    }

    #[test]
    fn empty_input_splits_to_empty_parts() {
        let split = split_dataset(Vec::<u8>::new(), &SplitConfig::default()).unwrap();
        assert!(split.is_empty());
    }

    #[test]
    fn invalid_ratios_are_rejected() {
        for ratio in [1.0, 1.5, -0.1, f64::NAN] {
            assert!(matches!(
                train_test_split(vec![1, 2, 3], ratio, 1),
                Err(DoccatError::InvalidSplit(_))
            ));
        }
    }
}
