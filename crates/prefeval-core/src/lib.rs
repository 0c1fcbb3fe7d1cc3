//! Evaluation harness for preference-learning algorithms.
//!
//! A run evaluates every algorithm on every dataset under one validation
//! policy (k-fold, percentage split, supplied test set or in-sample),
//! scores each trained model with a set of metrics, averages the scores
//! per evaluation set and returns the combined results.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod reducer;
pub mod report;
pub mod result;
pub mod scorer;
pub mod set_builder;
pub mod setting;
pub mod split;

pub use config::{load_config, EvalConfig};
pub use dataset::{Dataset, DatasetFile, DatasetParser, MemoryDataset};
pub use engine::{RunController, RunPhase};
pub use errors::{EvalError, EvalResult, FailureStage, SoftFailure};
pub use report::{ReportSink, RunReport};
pub use result::{EvaluationResult, LossValue};
pub use set_builder::{EvaluationSet, SetGrouping, SetId};
pub use setting::{Algorithm, AlgorithmId, EvaluationSetting, Metric, MetricLoss};
pub use split::{SplitPair, SplitPolicy, SuppliedTestSets, TrainFraction};
