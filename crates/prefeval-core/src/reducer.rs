//! Reduces the results of one set into a single combined result.

use crate::errors::{EvalError, EvalResult};
use crate::result::{EvaluationResult, LossValue};
use crate::set_builder::SetId;

/// Combines per-setting results by metric-wise arithmetic mean.
///
/// The first result is canonical: every other result must carry the same
/// algorithm, the same dataset and at least the canonical metrics, otherwise
/// the set fails with [`EvalError::NonUniqueGrouping`]. Null and non-numeric
/// losses are skipped; NaN is numeric and propagates into the mean. Only the
/// first result's annotation is kept.
///
/// An empty input yields an empty result, which is not an error here.
pub fn reduce(set_id: SetId, results: &[EvaluationResult]) -> EvalResult<EvaluationResult> {
    let Some(canonical) = results.first() else {
        return Ok(EvaluationResult::new());
    };

    for (idx, other) in results.iter().enumerate().skip(1) {
        check_comparable(set_id, canonical, other, idx)?;
    }

    let mut combined = EvaluationResult {
        algorithm: canonical.algorithm.clone(),
        dataset: canonical.dataset.clone(),
        annotation: canonical.annotation.clone(),
        reduced_from: results.len(),
        ..EvaluationResult::default()
    };

    for metric in canonical.metric_names() {
        combined.register_metric(metric);
        match mean_loss(set_id, metric, results) {
            Some(mean) => combined.set_loss(metric, LossValue::Double(mean)),
            None => tracing::warn!(
                set_id = set_id.0,
                metric,
                "no numeric loss to average; metric left uncomputed"
            ),
        }
    }
    Ok(combined)
}

fn check_comparable(
    set_id: SetId,
    canonical: &EvaluationResult,
    other: &EvaluationResult,
    idx: usize,
) -> EvalResult<()> {
    if other.algorithm != canonical.algorithm {
        return Err(EvalError::grouping(
            set_id,
            format!(
                "result {idx} was produced by {}, expected {}",
                display_opt(&other.algorithm),
                display_opt(&canonical.algorithm)
            ),
        ));
    }
    if other.dataset != canonical.dataset {
        return Err(EvalError::grouping(
            set_id,
            format!(
                "result {idx} was computed on {}, expected {}",
                display_opt(&other.dataset),
                display_opt(&canonical.dataset)
            ),
        ));
    }
    if let Some(missing) = canonical.metric_names().find(|m| !other.has_metric(m)) {
        return Err(EvalError::grouping(
            set_id,
            format!("result {idx} lacks metric {missing}"),
        ));
    }
    Ok(())
}

fn mean_loss(set_id: SetId, metric: &str, results: &[EvaluationResult]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (idx, result) in results.iter().enumerate() {
        match result.loss(metric).map(|v| (v, v.as_f64())) {
            Some((_, Some(value))) => {
                if value.is_nan() {
                    tracing::warn!(set_id = set_id.0, metric, result = idx, "averaging NaN loss");
                }
                sum += value;
                count += 1;
            }
            Some((value, None)) => tracing::warn!(
                set_id = set_id.0,
                metric,
                result = idx,
                value = ?value,
                "skipping non-numeric loss"
            ),
            None => tracing::warn!(
                set_id = set_id.0,
                metric,
                result = idx,
                "skipping missing loss"
            ),
        }
    }
    (count > 0).then(|| sum / count as f64)
}

fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}
