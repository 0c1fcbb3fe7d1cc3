use super::{shuffled, SplitPair};
use crate::dataset::Dataset;
use crate::errors::{EvalError, EvalResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Upper bound on percentage-split repeats.
pub const MAX_REPEATS: usize = 10;

/// Fraction of instances placed in the TRAINING set of a percentage split.
///
/// Note the orientation: 0.7 means 70% train / 30% test. Valid range is `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct TrainFraction(f64);

impl TrainFraction {
    pub const DEFAULT: Self = Self(0.66);

    pub fn new(fraction: f64) -> EvalResult<Self> {
        if (0.0..1.0).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(EvalError::config(format!(
                "train fraction must be in [0, 1), got {fraction}"
            )))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Number of training instances out of `n`, rounded to nearest.
    pub fn train_size(self, n: usize) -> usize {
        ((n as f64) * self.0).round() as usize
    }
}

impl Default for TrainFraction {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for TrainFraction {
    type Error = EvalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrainFraction> for f64 {
    fn from(value: TrainFraction) -> Self {
        value.0
    }
}

/// `repeats` independent shuffles of `dataset`, each split into a training
/// head of `train_fraction` and a test tail.
pub fn percentage_split<D, R>(
    dataset: &D,
    train_fraction: TrainFraction,
    repeats: usize,
    rng: &mut R,
) -> EvalResult<Vec<SplitPair<D>>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let file = dataset.dataset_file();
    if repeats > MAX_REPEATS {
        return Err(EvalError::split(
            file,
            format!("repeats must be at most {MAX_REPEATS}, got {repeats}"),
        ));
    }
    let n = dataset.len();
    if n == 0 {
        return Err(EvalError::split(file, "dataset is empty"));
    }
    let train_size = train_fraction.train_size(n);
    if train_size >= n {
        return Err(EvalError::split(
            file,
            format!(
                "train fraction {} leaves no test instances out of {n}",
                train_fraction.get()
            ),
        ));
    }

    let pairs = (0..repeats)
        .map(|_| {
            let data = shuffled(dataset, rng);
            SplitPair {
                test: Arc::new(data.subrange(train_size, n)),
                train: Arc::new(data.subrange(0, train_size)),
            }
        })
        .collect();
    Ok(pairs)
}
