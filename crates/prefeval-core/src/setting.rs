//! Algorithms, metrics and the immutable evaluation setting that binds them.

use crate::dataset::{Dataset, DatasetFile};
use crate::errors::EvalResult;
use crate::result::LossValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of a learning algorithm (including its hyper-parameters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A learning algorithm producing models of type `M` from datasets of type `D`.
pub trait Algorithm<D: Dataset, M> {
    fn id(&self) -> AlgorithmId;

    /// Fails with [`crate::errors::EvalError::TrainingFailure`].
    fn train(&self, train: &D) -> EvalResult<M>;
}

/// Loss reported by a metric, with an optional explanation for reports.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLoss {
    pub value: LossValue,
    pub note: Option<String>,
}

impl MetricLoss {
    pub fn new(value: LossValue) -> Self {
        Self { value, note: None }
    }

    pub fn double(value: f64) -> Self {
        Self::new(LossValue::Double(value))
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A loss function evaluated on a trained model and a test dataset.
pub trait Metric<D: Dataset, M> {
    fn name(&self) -> &str;

    /// Fails with [`crate::errors::EvalError::LossComputationFailure`] or
    /// [`crate::errors::EvalError::PredictionFailure`].
    fn compute_loss(&self, model: &M, test: &D) -> EvalResult<MetricLoss>;
}

/// One scoring unit: a trained model, the data to test it on and the metrics
/// to score it with. Built once per split pair and never modified.
pub struct EvaluationSetting<D: Dataset, M> {
    test: Arc<D>,
    algorithm: AlgorithmId,
    model: Arc<M>,
    metrics: Vec<Arc<dyn Metric<D, M>>>,
}

impl<D: Dataset, M> EvaluationSetting<D, M> {
    pub fn new(
        test: Arc<D>,
        algorithm: AlgorithmId,
        model: Arc<M>,
        metrics: Vec<Arc<dyn Metric<D, M>>>,
    ) -> Self {
        Self {
            test,
            algorithm,
            model,
            metrics,
        }
    }

    pub fn test(&self) -> &D {
        &self.test
    }

    pub fn dataset_file(&self) -> &DatasetFile {
        self.test.dataset_file()
    }

    pub fn algorithm(&self) -> &AlgorithmId {
        &self.algorithm
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn metrics(&self) -> &[Arc<dyn Metric<D, M>>] {
        &self.metrics
    }
}

impl<D: Dataset, M> Clone for EvaluationSetting<D, M> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
            algorithm: self.algorithm.clone(),
            model: Arc::clone(&self.model),
            metrics: self.metrics.clone(),
        }
    }
}

impl<D: Dataset, M> fmt::Debug for EvaluationSetting<D, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationSetting")
            .field("dataset", self.test.dataset_file())
            .field("instances", &self.test.len())
            .field("algorithm", &self.algorithm)
            .field(
                "metrics",
                &self.metrics.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
