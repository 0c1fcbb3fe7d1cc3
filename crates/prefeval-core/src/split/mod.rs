//! Validation policies that turn one dataset into (test, train) pairs.
//!
//! Every policy starts from a shuffled copy of the dataset, drawn from the
//! run's seeded RNG. The caller's dataset is never reordered.

pub mod in_sample;
pub mod kfold;
pub mod percentage;
pub mod supplied;

pub use in_sample::in_sample;
pub use kfold::{fold_bounds, k_fold};
pub use percentage::{percentage_split, TrainFraction, MAX_REPEATS};
pub use supplied::{supplied_test_sets, SuppliedTestSets};

use crate::dataset::{Dataset, DatasetParser};
use crate::errors::{EvalError, EvalResult};
use crate::set_builder::SetGrouping;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One (test, train) pair. Both sides keep the parent dataset file identity,
/// except supplied test sets whose test side is the supplied file.
#[derive(Debug)]
pub struct SplitPair<D> {
    pub test: Arc<D>,
    pub train: Arc<D>,
}

impl<D> Clone for SplitPair<D> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            train: Arc::clone(&self.train),
        }
    }
}

impl<D> SplitPair<D> {
    /// True when test and train are the very same dataset (in-sample).
    pub fn is_in_sample(&self) -> bool {
        Arc::ptr_eq(&self.test, &self.train)
    }
}

fn default_repeats() -> usize {
    1
}

/// How a dataset is divided into test and train data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// K-fold cross validation.
    ///
    /// **`folds == 1` means leave-one-out**, reinterpreted as
    /// `instance_count - 1` folds. It does not mean "one fold".
    KFold { folds: usize },
    /// Repeated random split. `train_fraction` is the share of instances
    /// used for TRAINING; the remainder is the test set.
    PercentageSplit {
        #[serde(default)]
        train_fraction: TrainFraction,
        #[serde(default = "default_repeats")]
        repeats: usize,
    },
    /// Train on the whole dataset, test on separately registered files.
    SuppliedTestSet {
        #[serde(default)]
        test_sets: SuppliedTestSets,
    },
    /// Test on the training data itself.
    InSample,
}

impl SplitPolicy {
    /// Checks the scalar parameters. File existence is checked by the config layer.
    pub fn validate(&self) -> EvalResult<()> {
        match self {
            Self::KFold { folds } if *folds == 0 => {
                Err(EvalError::config("k_fold: folds must be at least 1"))
            }
            Self::PercentageSplit { repeats, .. } if *repeats > MAX_REPEATS => Err(
                EvalError::config(format!(
                    "percentage_split: repeats must be at most {MAX_REPEATS}, got {repeats}"
                )),
            ),
            _ => Ok(()),
        }
    }

    /// How settings produced under this policy are grouped into sets.
    pub fn grouping(&self) -> SetGrouping {
        match self {
            Self::SuppliedTestSet { .. } => SetGrouping::PerPair,
            Self::KFold { .. } | Self::PercentageSplit { .. } | Self::InSample => {
                SetGrouping::PerCombination
            }
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KFold { folds: 1 } => write!(f, "leave-one-out"),
            Self::KFold { folds } => write!(f, "{folds}-fold cross validation"),
            Self::PercentageSplit {
                train_fraction,
                repeats,
            } => write!(
                f,
                "percentage split (train {:.2}, {} repeats)",
                train_fraction.get(),
                repeats
            ),
            Self::SuppliedTestSet { .. } => write!(f, "supplied test set"),
            Self::InSample => write!(f, "in-sample"),
        }
    }
}

/// Splits `dataset` according to `policy`.
///
/// `parser` is only consulted by [`SplitPolicy::SuppliedTestSet`].
pub fn split_pairs<D, R>(
    dataset: &D,
    policy: &SplitPolicy,
    rng: &mut R,
    parser: &dyn DatasetParser<D>,
) -> EvalResult<Vec<SplitPair<D>>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let pairs = match policy {
        SplitPolicy::KFold { folds } => k_fold(dataset, *folds, rng)?,
        SplitPolicy::PercentageSplit {
            train_fraction,
            repeats,
        } => percentage_split(dataset, *train_fraction, *repeats, rng)?,
        SplitPolicy::SuppliedTestSet { test_sets } => {
            supplied_test_sets(dataset, test_sets, rng, parser)?
        }
        SplitPolicy::InSample => in_sample(dataset, rng),
    };
    tracing::debug!(
        dataset = %dataset.dataset_file(),
        policy = %policy,
        pairs = pairs.len(),
        "dataset split"
    );
    Ok(pairs)
}

/// Shuffled copy of `dataset`.
pub(crate) fn shuffled<D, R>(dataset: &D, rng: &mut R) -> D
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let mut copy = dataset.clone();
    copy.shuffle(rng);
    copy
}
