//! Seeded train/holdout partitioning.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::TrainError;

/// Row indices for each side of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Shuffle `0..n` with a `StdRng` seeded from `seed`; the first
/// `ceil(test_fraction * n)` indices form the holdout, the rest the training
/// set. Identical inputs always give identical splits.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split, TrainError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainError::InvalidSplit(test_fraction));
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test >= n {
        return Err(TrainError::InsufficientData {
            total: n,
            holdout: n_test,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        holdout: indices,
    })
}
