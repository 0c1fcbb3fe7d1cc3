//! YAML run configuration.

use crate::dataset::DatasetFile;
use crate::errors::{EvalError, EvalResult};
use crate::split::SplitPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// A run described on disk:
///
/// ```yaml
/// version: 1
/// seed: 42
/// datasets: [data/sushi.txt]
/// validation:
///   kind: k_fold
///   folds: 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalConfig {
    pub version: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub datasets: Vec<PathBuf>,
    pub validation: SplitPolicy,
}

impl EvalConfig {
    pub fn dataset_files(&self) -> Vec<DatasetFile> {
        self.datasets.iter().map(DatasetFile::new).collect()
    }

    /// Checks everything that can be checked before any dataset is read.
    pub fn validate(&self) -> EvalResult<()> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(EvalError::config(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if self.datasets.is_empty() {
            return Err(EvalError::config("config has no datasets"));
        }
        self.validation.validate()?;

        if let SplitPolicy::SuppliedTestSet { test_sets } = &self.validation {
            if test_sets.is_empty() {
                return Err(EvalError::config(
                    "supplied_test_set: no test files registered",
                ));
            }
            let names: BTreeSet<String> =
                self.dataset_files().iter().map(DatasetFile::name).collect();
            for training in test_sets.training_names() {
                if !names.contains(training) {
                    return Err(EvalError::config(format!(
                        "supplied_test_set: {training} is not a configured dataset"
                    )));
                }
            }
            for (_, path) in test_sets.iter() {
                if !path.exists() {
                    return Err(EvalError::TestFileMissing {
                        path: path.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> EvalResult<EvalConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        EvalError::config(format!("failed to read config {}: {}", path.display(), e))
    })?;
    let cfg: EvalConfig = serde_yaml::from_str(&raw)
        .map_err(|e| EvalError::config(format!("failed to parse YAML: {}", e)))?;
    cfg.validate()?;
    tracing::debug!(
        path = %path.display(),
        datasets = cfg.datasets.len(),
        policy = %cfg.validation,
        "config loaded"
    );
    Ok(cfg)
}
