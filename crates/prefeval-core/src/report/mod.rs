pub mod json;
pub mod progress;

use crate::dataset::DatasetFile;
use crate::errors::SoftFailure;
use crate::result::EvaluationResult;
use crate::split::SplitPolicy;
use serde::{Deserialize, Serialize};

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Seed that drove every split of the run.
    pub seed: u64,
    pub policy: SplitPolicy,
    /// Distinct datasets referenced by `results`, in first-seen order.
    pub datasets: Vec<DatasetFile>,
    /// Accepted combined results, one per surviving set.
    pub results: Vec<EvaluationResult>,
    pub soft_failures: Vec<SoftFailure>,
}

impl RunReport {
    /// Accepted results computed on `dataset`.
    pub fn results_for<'a>(
        &'a self,
        dataset: &'a DatasetFile,
    ) -> impl Iterator<Item = &'a EvaluationResult> + 'a {
        self.results
            .iter()
            .filter(move |r| r.dataset.as_ref() == Some(dataset))
    }
}

/// Receives the outcome of a successful run (console tables, files, ...).
pub trait ReportSink {
    fn report(&self, datasets: &[DatasetFile], results: &[EvaluationResult])
        -> anyhow::Result<()>;
}

/// Deduplicates the dataset identities of `results`, keeping first-seen order.
pub fn distinct_datasets(results: &[EvaluationResult]) -> Vec<DatasetFile> {
    let mut out: Vec<DatasetFile> = Vec::new();
    for dataset in results.iter().filter_map(|r| r.dataset.as_ref()) {
        if !out.contains(dataset) {
            out.push(dataset.clone());
        }
    }
    out
}
