use super::{shuffled, SplitPair};
use crate::dataset::Dataset;
use crate::errors::{EvalError, EvalResult};
use rand::Rng;
use std::sync::Arc;

/// Test ranges `[start, end)` for `folds` folds over `n` instances.
///
/// Every fold but the last gets `n / folds` instances; the last one absorbs
/// the rounding remainder.
pub fn fold_bounds(n: usize, folds: usize) -> Vec<(usize, usize)> {
    if folds == 0 {
        return Vec::new();
    }
    let chunk = n / folds;
    (0..folds)
        .map(|i| {
            if i + 1 < folds {
                (i * chunk, (i + 1) * chunk)
            } else {
                let remainder = n - (folds - 1) * chunk;
                (n - remainder, n)
            }
        })
        .collect()
}

/// K-fold cross validation over a shuffled copy of `dataset`.
///
/// `folds == 1` is leave-one-out and becomes `n - 1` folds.
pub fn k_fold<D, R>(dataset: &D, folds: usize, rng: &mut R) -> EvalResult<Vec<SplitPair<D>>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let file = dataset.dataset_file();
    let n = dataset.len();
    if folds == 0 {
        return Err(EvalError::split(file, "fold count must be at least 1"));
    }
    if folds > n {
        return Err(EvalError::split(
            file,
            format!("{folds} folds requested but dataset has only {n} instances"),
        ));
    }
    let folds = if folds == 1 {
        tracing::debug!(dataset = %file, folds = n - 1, "folds=1 runs leave-one-out");
        n - 1
    } else {
        folds
    };
    if folds == 0 {
        return Err(EvalError::split(
            file,
            "leave-one-out needs at least 2 instances",
        ));
    }

    let data = shuffled(dataset, rng);
    let pairs = fold_bounds(n, folds)
        .into_iter()
        .map(|(start, end)| {
            let test = data.subrange(start, end);
            let mut train = data.subrange(0, start);
            for i in end..n {
                if let Some(inst) = data.instance(i) {
                    train.push(inst.clone());
                }
            }
            SplitPair {
                test: Arc::new(test),
                train: Arc::new(train),
            }
        })
        .collect();
    Ok(pairs)
}
