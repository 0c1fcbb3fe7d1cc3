//! Scores one evaluation setting against its metrics.

use crate::dataset::Dataset;
use crate::errors::EvalResult;
use crate::result::EvaluationResult;
use crate::setting::EvaluationSetting;

/// Runs every metric of `setting` and collects the losses.
///
/// The first failing metric aborts scoring of this setting; nothing is retried.
/// When several metrics explain their loss, the last explanation wins.
pub fn score<D: Dataset, M>(setting: &EvaluationSetting<D, M>) -> EvalResult<EvaluationResult> {
    let mut result = EvaluationResult::for_subject(setting.algorithm(), setting.dataset_file());
    result.reduced_from = 1;
    for metric in setting.metrics() {
        result.register_metric(metric.name());
    }

    for metric in setting.metrics() {
        let loss = metric.compute_loss(setting.model(), setting.test())?;
        tracing::trace!(
            algorithm = %setting.algorithm(),
            dataset = %setting.dataset_file(),
            metric = metric.name(),
            loss = ?loss.value,
            "metric computed"
        );
        result.set_loss(metric.name(), loss.value);
        if let Some(note) = loss.note {
            result.annotation = note;
        }
    }
    Ok(result)
}
