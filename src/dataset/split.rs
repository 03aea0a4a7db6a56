//! Train/test partitioning
//!
//! The permutation comes from a seeded `StdRng`, so the same table, ratio and
//! seed always produce the same membership. The first `ceil(ratio * n)`
//! shuffled rows form the test set and the rest form the train set.

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Dataset;
use crate::config::SplitConfig;
use crate::error::{Error, Result};

/// Disjoint, covering train and test halves of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPair {
    pub train: Dataset,
    pub test: Dataset,
}

/// Splits a dataset by a fixed ratio and seed
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    test_ratio: f64,
    seed: u64,
}

impl Partitioner {
    pub fn new(test_ratio: f64, seed: u64) -> Result<Self> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(Error::InvalidInput(format!(
                "test ratio must be in (0, 1), got {}",
                test_ratio
            )));
        }
        Ok(Partitioner { test_ratio, seed })
    }

    pub fn from_config(config: &SplitConfig) -> Result<Self> {
        Self::new(config.test_ratio, config.seed)
    }

    pub fn test_ratio(&self) -> f64 {
        self.test_ratio
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Row positions of the (train, test) halves for a table of `n_rows`
    pub fn split_indices(&self, n_rows: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        if n_rows == 0 {
            return Err(Error::EmptyData("cannot split an empty dataset".to_string()));
        }

        let n_test = (self.test_ratio * n_rows as f64).ceil() as usize;
        if n_test == 0 || n_test >= n_rows {
            return Err(Error::InvalidInput(format!(
                "test ratio {} leaves an empty partition for {} rows",
                self.test_ratio, n_rows
            )));
        }

        let mut permutation: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        permutation.shuffle(&mut rng);

        let train = permutation.split_off(n_test);
        Ok((train, permutation))
    }

    /// Split a dataset into train and test halves
    pub fn split(&self, data: &Dataset) -> Result<PartitionPair> {
        info!(
            "Train test split initiated (test ratio {}, seed {})",
            self.test_ratio, self.seed
        );

        let (train_idx, test_idx) = self.split_indices(data.len())?;
        let pair = PartitionPair {
            train: data.select(&train_idx)?,
            test: data.select(&test_idx)?,
        };

        info!(
            "Split completed: {} train rows, {} test rows",
            pair.train.len(),
            pair.test.len()
        );
        Ok(pair)
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Partitioner {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn indices_are_disjoint_and_covering() {
        let partitioner = Partitioner::default();
        let (train, test) = partitioner.split_indices(103).unwrap();
        assert_eq!(test.len(), 21);
        assert_eq!(train.len(), 82);

        let all: HashSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), 103);
        assert!((0..103).all(|i| all.contains(&i)));
    }

    #[test]
    fn same_seed_same_membership() {
        let a = Partitioner::new(0.2, 7).unwrap().split_indices(50).unwrap();
        let b = Partitioner::new(0.2, 7).unwrap().split_indices(50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_42_permutation_of_ten_rows() {
        let (train, test) = Partitioner::default().split_indices(10).unwrap();
        assert_eq!(test, vec![8, 6]);
        assert_eq!(train, vec![3, 2, 1, 5, 9, 7, 4, 0]);
    }

    #[test]
    fn rejects_bad_ratio() {
        assert!(Partitioner::new(0.0, 42).is_err());
        assert!(Partitioner::new(1.0, 42).is_err());
        assert!(Partitioner::new(f64::NAN, 42).is_err());
    }

    #[test]
    fn rejects_degenerate_tables() {
        let partitioner = Partitioner::default();
        assert!(matches!(partitioner.split_indices(0), Err(Error::EmptyData(_))));
        assert!(matches!(partitioner.split_indices(1), Err(Error::InvalidInput(_))));
        let (train, test) = partitioner.split_indices(2).unwrap();
        assert_eq!((train.len(), test.len()), (1, 1));
    }
}
