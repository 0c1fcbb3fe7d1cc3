//! Error types for the evaluation engine.

use crate::dataset::DatasetFile;
use crate::setting::AlgorithmId;
use crate::set_builder::SetId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Evaluation errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Split parameters cannot be satisfied for this dataset.
    #[error("split failed for {dataset}: {reason}")]
    SplitFailure { dataset: DatasetFile, reason: String },

    /// The training dataset has no registered supplied test files.
    #[error("no supplied test set registered for {dataset}")]
    NoMappingFound { dataset: DatasetFile },

    /// A registered supplied test file does not exist.
    #[error("supplied test file not found: {}", path.display())]
    TestFileMissing { path: PathBuf },

    /// A registered supplied test file exists but could not be parsed.
    #[error("supplied test file {} could not be parsed: {message}", path.display())]
    TestFileParse { path: PathBuf, message: String },

    /// A configured training dataset could not be loaded.
    #[error("dataset {} could not be loaded: {message}", path.display())]
    DatasetLoad { path: PathBuf, message: String },

    /// Model training failed.
    #[error("training failed: {message}")]
    TrainingFailure { message: String },

    /// The model could not produce predictions for the test data.
    #[error("prediction failed: {message}")]
    PredictionFailure { message: String },

    /// A metric could not compute its loss.
    #[error("loss computation failed for metric {metric}: {message}")]
    LossComputationFailure { metric: String, message: String },

    /// Results collected for one set are not comparable.
    #[error("set {set_id} cannot be reduced: {reason}")]
    NonUniqueGrouping { set_id: SetId, reason: String },

    /// No combined result survived validation.
    #[error("run produced no results ({failures} soft failures recorded)")]
    RunProducedNoResults { failures: usize },

    /// Configuration is missing, unreadable or invalid.
    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Level of the run a failure is fatal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// One algorithm x dataset combination.
    Pair,
    /// One evaluation setting.
    Setting,
    /// One set.
    Set,
    /// The whole run.
    Run,
}

impl EvalError {
    pub fn split(dataset: &DatasetFile, reason: impl Into<String>) -> Self {
        Self::SplitFailure {
            dataset: dataset.clone(),
            reason: reason.into(),
        }
    }

    pub fn training(message: impl Into<String>) -> Self {
        Self::TrainingFailure {
            message: message.into(),
        }
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::PredictionFailure {
            message: message.into(),
        }
    }

    pub fn loss(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LossComputationFailure {
            metric: metric.into(),
            message: message.into(),
        }
    }

    pub fn grouping(set_id: SetId, reason: impl Into<String>) -> Self {
        Self::NonUniqueGrouping {
            set_id,
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Which part of the run this error takes down.
    pub fn severity(&self) -> Severity {
        match self {
            Self::SplitFailure { .. }
            | Self::NoMappingFound { .. }
            | Self::TestFileMissing { .. }
            | Self::TestFileParse { .. }
            | Self::DatasetLoad { .. }
            | Self::TrainingFailure { .. } => Severity::Pair,

            Self::PredictionFailure { .. } | Self::LossComputationFailure { .. } => {
                Severity::Setting
            }

            Self::NonUniqueGrouping { .. } => Severity::Set,

            Self::RunProducedNoResults { .. } | Self::Config { .. } => Severity::Run,
        }
    }

    /// Stage a soft failure caused by this error is recorded under.
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::DatasetLoad { .. } => FailureStage::DatasetLoad,
            Self::SplitFailure { .. }
            | Self::NoMappingFound { .. }
            | Self::TestFileMissing { .. }
            | Self::TestFileParse { .. } => FailureStage::Split,
            Self::TrainingFailure { .. } => FailureStage::Training,
            Self::PredictionFailure { .. } | Self::LossComputationFailure { .. } => {
                FailureStage::Scoring
            }
            Self::NonUniqueGrouping { .. } => FailureStage::Grouping,
            Self::RunProducedNoResults { .. } | Self::Config { .. } => FailureStage::Validation,
        }
    }

    /// Whether the error is fatal to the whole run.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Run
    }
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Stage of the run at which a soft failure was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    DatasetLoad,
    Split,
    Training,
    Scoring,
    Grouping,
    Validation,
}

/// A failure that degraded the run without aborting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftFailure {
    pub stage: FailureStage,
    pub algorithm: Option<AlgorithmId>,
    pub dataset: Option<DatasetFile>,
    pub set_id: Option<SetId>,
    pub message: String,
}

impl SoftFailure {
    pub fn new(stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            algorithm: None,
            dataset: None,
            set_id: None,
            message: message.into(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: &AlgorithmId) -> Self {
        self.algorithm = Some(algorithm.clone());
        self
    }

    pub fn with_dataset(mut self, dataset: &DatasetFile) -> Self {
        self.dataset = Some(dataset.clone());
        self
    }

    pub fn with_set(mut self, set_id: SetId) -> Self {
        self.set_id = Some(set_id);
        self
    }
}
