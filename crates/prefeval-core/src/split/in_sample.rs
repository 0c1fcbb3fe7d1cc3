use super::{shuffled, SplitPair};
use crate::dataset::Dataset;
use rand::Rng;
use std::sync::Arc;

/// A single pair whose test and train sides are the same dataset.
pub fn in_sample<D, R>(dataset: &D, rng: &mut R) -> Vec<SplitPair<D>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let shared = Arc::new(shuffled(dataset, rng));
    vec![SplitPair {
        test: Arc::clone(&shared),
        train: shared,
    }]
}
