use crate::dataset::Dataset;
use crate::errors::{FailureStage, SoftFailure};
use crate::reducer::reduce;
use crate::report::progress::{ProgressEvent, ProgressSink};
use crate::result::EvaluationResult;
use crate::scorer::score;
use crate::set_builder::{EvaluationSet, SetId};

/// Scores and reduces every set. Sets whose results cannot be grouped are dropped.
pub(crate) fn run_sets<D: Dataset, M>(
    sets: Vec<EvaluationSet<D, M>>,
    progress: Option<&ProgressSink>,
    soft: &mut Vec<SoftFailure>,
) -> Vec<(SetId, EvaluationResult)> {
    let total = sets.len();
    let mut combined = Vec::with_capacity(total);
    for (done, set) in sets.into_iter().enumerate() {
        let results = score_set(&set, soft);
        match reduce(set.id, &results) {
            Ok(result) => combined.push((set.id, result)),
            Err(e) => {
                tracing::warn!(set_id = set.id.0, error = %e, "set dropped");
                soft.push(
                    SoftFailure::new(e.stage(), e.to_string())
                        .with_algorithm(&set.algorithm)
                        .with_dataset(&set.dataset)
                        .with_set(set.id),
                );
            }
        }
        if let Some(sink) = progress {
            sink(ProgressEvent {
                done: done + 1,
                total,
            });
        }
    }
    combined
}

fn score_set<D: Dataset, M>(
    set: &EvaluationSet<D, M>,
    soft: &mut Vec<SoftFailure>,
) -> Vec<EvaluationResult> {
    let mut results = Vec::with_capacity(set.settings.len());
    for setting in &set.settings {
        match score(setting) {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!(
                    set_id = set.id.0,
                    algorithm = %setting.algorithm(),
                    dataset = %setting.dataset_file(),
                    error = %e,
                    "setting not scored"
                );
                soft.push(
                    SoftFailure::new(e.stage(), e.to_string())
                        .with_algorithm(setting.algorithm())
                        .with_dataset(setting.dataset_file())
                        .with_set(set.id),
                );
            }
        }
    }
    results
}

/// Keeps combined results with a non-empty, fully computed metric map.
pub(crate) fn accept_valid(
    combined: Vec<(SetId, EvaluationResult)>,
    soft: &mut Vec<SoftFailure>,
) -> Vec<EvaluationResult> {
    let mut accepted = Vec::with_capacity(combined.len());
    for (set_id, result) in combined {
        if result.is_valid() {
            accepted.push(result);
            continue;
        }
        let message = if result.is_empty() {
            "no setting of the set could be scored".to_string()
        } else if result.losses.is_empty() {
            "combined result has no metrics".to_string()
        } else {
            let missing: Vec<&str> = result
                .losses
                .iter()
                .filter(|(_, v)| v.is_none())
                .map(|(k, _)| k.as_str())
                .collect();
            format!("combined result has uncomputed metrics: {}", missing.join(", "))
        };
        tracing::warn!(set_id = set_id.0, reason = %message, "combined result rejected");
        let mut failure = SoftFailure::new(FailureStage::Validation, message).with_set(set_id);
        failure.algorithm = result.algorithm.clone();
        failure.dataset = result.dataset.clone();
        soft.push(failure);
    }
    accepted
}
