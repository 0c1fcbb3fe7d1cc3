//! Dataset collaborators consumed by the engine.
//!
//! The engine never looks inside an instance. It only needs to know how many
//! there are, how to copy ranges of them, and where they came from.

pub mod memory;

pub use memory::MemoryDataset;

use crate::errors::EvalResult;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a physical dataset source. Equality is path based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetFile {
    path: PathBuf,
}

impl DatasetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component. Supplied test sets are registered under this name.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl fmt::Display for DatasetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<&Path> for DatasetFile {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// An ordered collection of instances originating from one [`DatasetFile`].
///
/// `subrange` and `empty_like` return new datasets; only `shuffle` and `push`
/// mutate, and only the receiver.
pub trait Dataset: Clone {
    type Instance: Clone;

    fn dataset_file(&self) -> &DatasetFile;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn instance(&self, index: usize) -> Option<&Self::Instance>;

    /// Copy of the instances in `[from, to)`, keeping the dataset file identity.
    fn subrange(&self, from: usize, to: usize) -> Self;

    /// Empty dataset with the same dataset file identity.
    fn empty_like(&self) -> Self;

    fn push(&mut self, instance: Self::Instance);

    fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R);
}

/// Turns a dataset file on disk into a [`Dataset`].
pub trait DatasetParser<D: Dataset> {
    fn parse(&self, file: &DatasetFile) -> EvalResult<D>;
}

impl<D, F> DatasetParser<D> for F
where
    D: Dataset,
    F: Fn(&DatasetFile) -> EvalResult<D>,
{
    fn parse(&self, file: &DatasetFile) -> EvalResult<D> {
        self(file)
    }
}
