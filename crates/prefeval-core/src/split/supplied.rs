use super::{shuffled, SplitPair};
use crate::dataset::{Dataset, DatasetFile, DatasetParser};
use crate::errors::{EvalError, EvalResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Externally supplied test files, keyed by the training dataset's file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuppliedTestSets {
    by_training_name: BTreeMap<String, Vec<PathBuf>>,
}

impl SuppliedTestSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, training_name: impl Into<String>, test_path: impl Into<PathBuf>) {
        self.by_training_name
            .entry(training_name.into())
            .or_default()
            .push(test_path.into());
    }

    pub fn paths_for(&self, training: &DatasetFile) -> &[PathBuf] {
        self.by_training_name
            .get(&training.name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn training_names(&self) -> impl Iterator<Item = &str> {
        self.by_training_name.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.by_training_name
            .iter()
            .flat_map(|(name, paths)| paths.iter().map(move |p| (name.as_str(), p.as_path())))
    }

    pub fn is_empty(&self) -> bool {
        self.by_training_name.values().all(Vec::is_empty)
    }
}

/// Pairs the whole (shuffled) training dataset with each registered test file.
///
/// All pairs share one training dataset.
pub fn supplied_test_sets<D, R>(
    dataset: &D,
    test_sets: &SuppliedTestSets,
    rng: &mut R,
    parser: &dyn DatasetParser<D>,
) -> EvalResult<Vec<SplitPair<D>>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let paths = test_sets.paths_for(dataset.dataset_file());
    if paths.is_empty() {
        return Err(EvalError::NoMappingFound {
            dataset: dataset.dataset_file().clone(),
        });
    }

    let train = Arc::new(shuffled(dataset, rng));
    paths
        .iter()
        .map(|path| {
            let file = DatasetFile::new(path);
            if !file.exists() {
                return Err(EvalError::TestFileMissing { path: path.clone() });
            }
            let test = parser.parse(&file).map_err(|e| EvalError::TestFileParse {
                path: path.clone(),
                message: e.to_string(),
            })?;
            Ok(SplitPair {
                test: Arc::new(test),
                train: Arc::clone(&train),
            })
        })
        .collect()
}
