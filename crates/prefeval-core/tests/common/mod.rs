#![allow(dead_code)]

use prefeval_core::{
    Algorithm, AlgorithmId, Dataset, DatasetFile, EvalError, EvalResult, MemoryDataset, Metric,
    MetricLoss,
};
use std::path::Path;

pub type Ds = MemoryDataset<f64>;

pub fn dataset(name: &str, values: &[f64]) -> Ds {
    MemoryDataset::new(DatasetFile::new(name), values.to_vec())
}

pub fn write_dataset(dir: &Path, name: &str, values: &[f64]) -> DatasetFile {
    let path = dir.join(name);
    let body: String = values.iter().map(|v| format!("{v}\n")).collect();
    std::fs::write(&path, body).unwrap();
    DatasetFile::new(path)
}

/// One `f64` per line.
pub fn line_parser(file: &DatasetFile) -> EvalResult<Ds> {
    let raw = std::fs::read_to_string(file.path()).map_err(|e| EvalError::DatasetLoad {
        path: file.path().to_path_buf(),
        message: e.to_string(),
    })?;
    let values = raw
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EvalError::DatasetLoad {
            path: file.path().to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(MemoryDataset::new(file.clone(), values))
}

/// Predicts the mean of its training data.
pub struct MeanPredictor;

impl Algorithm<Ds, f64> for MeanPredictor {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::new("mean")
    }

    fn train(&self, train: &Ds) -> EvalResult<f64> {
        if train.is_empty() {
            return Err(EvalError::training("empty training data"));
        }
        Ok(train.instances().iter().sum::<f64>() / train.len() as f64)
    }
}

/// Never produces a model.
pub struct BrokenLearner;

impl Algorithm<Ds, f64> for BrokenLearner {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::new("broken")
    }

    fn train(&self, _train: &Ds) -> EvalResult<f64> {
        Err(EvalError::training("solver diverged"))
    }
}

/// Mean absolute error of the model's constant prediction.
pub struct AbsError;

impl Metric<Ds, f64> for AbsError {
    fn name(&self) -> &str {
        "abs_error"
    }

    fn compute_loss(&self, model: &f64, test: &Ds) -> EvalResult<MetricLoss> {
        if test.is_empty() {
            return Err(EvalError::loss(self.name(), "empty test set"));
        }
        let total: f64 = test.instances().iter().map(|v| (v - model).abs()).sum();
        Ok(MetricLoss::double(total / test.len() as f64))
    }
}

/// Fails on any test set containing `poison`, scores zero otherwise.
pub struct FailsOn(pub f64);

impl Metric<Ds, f64> for FailsOn {
    fn name(&self) -> &str {
        "fails_on"
    }

    fn compute_loss(&self, _model: &f64, test: &Ds) -> EvalResult<MetricLoss> {
        if test.instances().contains(&self.0) {
            return Err(EvalError::prediction(format!("cannot rank {}", self.0)));
        }
        Ok(MetricLoss::double(0.0))
    }
}
