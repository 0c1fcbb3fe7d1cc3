//! Evaluation results: per-setting scores and their reduced combinations.

use crate::dataset::DatasetFile;
use crate::setting::AlgorithmId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value produced by a loss function.
///
/// Serialized as a plain JSON value. On the way back whole numbers become
/// `Integer`, other numbers `Double` (a `Float` is read back widened), and
/// anything else `Other`. serde_json writes NaN as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LossValue {
    Integer(i64),
    Double(f64),
    Float(f32),
    /// Non-numeric payload (e.g. a confusion matrix). Never averaged.
    Other(serde_json::Value),
}

impl LossValue {
    /// Numeric view of the loss; `None` for non-numeric payloads. NaN is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Integer(v) => Some(*v as f64),
            Self::Other(_) => None,
        }
    }
}

/// Metric name to loss map plus the identity it was computed for.
///
/// A `None` loss marks a metric that was registered but never computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub algorithm: Option<AlgorithmId>,
    pub dataset: Option<DatasetFile>,
    pub losses: BTreeMap<String, Option<LossValue>>,
    pub annotation: String,
    /// Number of per-setting results combined into this one (1 for a raw score).
    pub reduced_from: usize,
}

impl EvaluationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_subject(algorithm: &AlgorithmId, dataset: &DatasetFile) -> Self {
        Self {
            algorithm: Some(algorithm.clone()),
            dataset: Some(dataset.clone()),
            ..Self::default()
        }
    }

    /// Adds a placeholder entry for `metric`. Existing values are kept.
    pub fn register_metric(&mut self, metric: impl Into<String>) {
        self.losses.entry(metric.into()).or_insert(None);
    }

    pub fn set_loss(&mut self, metric: impl Into<String>, value: LossValue) {
        self.losses.insert(metric.into(), Some(value));
    }

    pub fn loss(&self, metric: &str) -> Option<&LossValue> {
        self.losses.get(metric).and_then(Option::as_ref)
    }

    pub fn has_metric(&self, metric: &str) -> bool {
        self.losses.contains_key(metric)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.losses.keys().map(String::as_str)
    }

    /// True when at least one metric is registered and every metric has a value.
    pub fn is_valid(&self) -> bool {
        !self.losses.is_empty() && self.losses.values().all(Option::is_some)
    }

    /// True for the degenerate result of reducing an empty set.
    pub fn is_empty(&self) -> bool {
        self.algorithm.is_none() && self.dataset.is_none() && self.losses.is_empty()
    }
}
