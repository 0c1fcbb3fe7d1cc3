use super::RunController;
use crate::dataset::{Dataset, DatasetParser};
use crate::errors::{EvalResult, FailureStage, SoftFailure};
use crate::set_builder::{EvaluationSet, SetBuilder};
use crate::setting::{Algorithm, EvaluationSetting};
use crate::split::split_pairs;
use rand::Rng;
use std::sync::Arc;

/// Splits, trains and groups settings for every algorithm x dataset combination.
/// A combination whose split or training fails contributes no set.
pub(crate) fn build_sets<D, M, R>(
    ctl: &RunController<D, M>,
    rng: &mut R,
    parser: &dyn DatasetParser<D>,
    soft: &mut Vec<SoftFailure>,
) -> Vec<EvaluationSet<D, M>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let mut builder = SetBuilder::new(ctl.policy.grouping());
    for algorithm in &ctl.algorithms {
        let algorithm_id = algorithm.id();
        for dataset in &ctl.datasets {
            let file = dataset.dataset_file();
            match settings_for_combination(ctl, algorithm.as_ref(), dataset, rng, parser) {
                Ok(settings) if settings.is_empty() => {
                    tracing::warn!(
                        algorithm = %algorithm_id,
                        dataset = %file,
                        policy = %ctl.policy,
                        "split produced no pairs; combination skipped"
                    );
                    soft.push(
                        SoftFailure::new(FailureStage::Split, "split produced no pairs")
                            .with_algorithm(&algorithm_id)
                            .with_dataset(file),
                    );
                }
                Ok(settings) => {
                    let n = settings.len();
                    let ids = builder.add_combination(&algorithm_id, file, settings);
                    tracing::debug!(
                        algorithm = %algorithm_id,
                        dataset = %file,
                        settings = n,
                        sets = ids.len(),
                        "settings registered"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        algorithm = %algorithm_id,
                        dataset = %file,
                        error = %e,
                        "combination skipped"
                    );
                    soft.push(
                        SoftFailure::new(e.stage(), e.to_string())
                            .with_algorithm(&algorithm_id)
                            .with_dataset(file),
                    );
                }
            }
        }
    }
    let sets = builder.finish();
    tracing::info!(sets = sets.len(), "sets built");
    sets
}

fn settings_for_combination<D, M, R>(
    ctl: &RunController<D, M>,
    algorithm: &dyn Algorithm<D, M>,
    dataset: &D,
    rng: &mut R,
    parser: &dyn DatasetParser<D>,
) -> EvalResult<Vec<EvaluationSetting<D, M>>>
where
    D: Dataset,
    R: Rng + ?Sized,
{
    let pairs = split_pairs(dataset, &ctl.policy, rng, parser)?;
    let algorithm_id = algorithm.id();
    let mut settings = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let model = algorithm.train(&pair.train)?;
        settings.push(EvaluationSetting::new(
            Arc::clone(&pair.test),
            algorithm_id.clone(),
            Arc::new(model),
            ctl.metrics.clone(),
        ));
    }
    Ok(settings)
}
