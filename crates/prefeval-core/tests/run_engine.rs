mod common;

use common::*;
use prefeval_core::report::progress::ProgressEvent;
use prefeval_core::{
    load_config, AlgorithmId, DatasetFile, EvalError, EvaluationResult, FailureStage, LossValue,
    ReportSink, RunController, SetId, SplitPolicy, SuppliedTestSets, TrainFraction,
};
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

fn kfold(folds: usize) -> SplitPolicy {
    SplitPolicy::KFold { folds }
}

#[test]
fn failing_algorithm_only_loses_its_own_combination() {
    let report = RunController::new(kfold(4))
        .with_seed(1)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]))
        .with_algorithm(MeanPredictor)
        .with_algorithm(BrokenLearner)
        .with_metric(AbsError)
        .run()
        .unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.algorithm, Some(AlgorithmId::new("mean")));
    assert_eq!(result.reduced_from, 4);
    assert!(result.is_valid());

    assert_eq!(report.soft_failures.len(), 1);
    let failure = &report.soft_failures[0];
    assert_eq!(failure.stage, FailureStage::Training);
    assert_eq!(failure.algorithm, Some(AlgorithmId::new("broken")));
    assert_eq!(failure.dataset, Some(DatasetFile::new("a.txt")));
    assert!(failure.message.contains("solver diverged"));
}

#[test]
fn run_without_any_result_is_fatal() {
    let err = RunController::new(kfold(2))
        .with_seed(1)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_algorithm(BrokenLearner)
        .with_metric(AbsError)
        .run()
        .unwrap_err();
    assert!(matches!(err, EvalError::RunProducedNoResults { failures: 1 }));
    assert!(err.is_fatal());
}

#[test]
fn run_without_metrics_produces_no_valid_result() {
    let err = RunController::<Ds, f64>::new(SplitPolicy::InSample)
        .with_seed(1)
        .with_dataset(dataset("a.txt", &[1.0, 3.0]))
        .with_algorithm(MeanPredictor)
        .run()
        .unwrap_err();
    assert!(matches!(err, EvalError::RunProducedNoResults { .. }));
}

#[test]
fn leave_one_out_uses_instance_count_minus_one_folds() {
    let report = RunController::new(kfold(1))
        .with_seed(3)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0, 5.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].reduced_from, 4);
}

#[test]
fn in_sample_scores_on_training_data() {
    let report = RunController::new(SplitPolicy::InSample)
        .with_dataset(dataset("a.txt", &[1.0, 3.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    let result = &report.results[0];
    assert_eq!(result.loss("abs_error"), Some(&LossValue::Double(1.0)));
    assert_eq!(result.reduced_from, 1);
}

#[test]
fn percentage_split_averages_every_repeat() {
    let policy = SplitPolicy::PercentageSplit {
        train_fraction: TrainFraction::new(0.5).unwrap(),
        repeats: 3,
    };
    let report = RunController::new(policy)
        .with_seed(5)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].reduced_from, 3);
}

#[test]
fn zero_repeats_explain_the_empty_run() {
    let policy = SplitPolicy::PercentageSplit {
        train_fraction: TrainFraction::DEFAULT,
        repeats: 0,
    };
    let err = RunController::new(policy)
        .with_seed(5)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap_err();
    assert!(matches!(err, EvalError::RunProducedNoResults { failures: 1 }));
}

#[test]
fn one_set_per_algorithm_and_dataset() {
    let report = RunController::new(kfold(2))
        .with_seed(11)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_dataset(dataset("b.txt", &[5.0, 6.0, 7.0, 8.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(
        report.datasets,
        vec![DatasetFile::new("a.txt"), DatasetFile::new("b.txt")]
    );
    assert!(report.results.iter().all(|r| r.reduced_from == 2));
}

#[test]
fn scoring_failure_drops_only_that_setting() {
    let report = RunController::new(kfold(4))
        .with_seed(2)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .with_metric(FailsOn(8.0))
        .run()
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].reduced_from, 3);
    assert_eq!(report.soft_failures.len(), 1);
    let failure = &report.soft_failures[0];
    assert_eq!(failure.stage, FailureStage::Scoring);
    assert_eq!(failure.set_id, Some(SetId(0)));
}

#[test]
fn same_seed_same_report() {
    let run = || {
        RunController::new(SplitPolicy::PercentageSplit {
            train_fraction: TrainFraction::new(0.6).unwrap(),
            repeats: 4,
        })
        .with_seed(9)
        .with_dataset(dataset("a.txt", &[1.0, 4.0, 9.0, 16.0, 25.0, 36.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second, "same seed must yield identical reports");
    assert_eq!(first.seed, 9);
}

#[test]
fn generated_seed_is_recorded_and_replays() {
    let ctl = RunController::new(kfold(3))
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError);
    let first = ctl.run().unwrap();

    let replay = RunController::new(kfold(3))
        .with_seed(first.seed)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    assert_eq!(first, replay);
}

#[test]
fn each_supplied_test_file_is_its_own_set() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_dataset(dir.path(), "first.txt", &[2.0, 2.0]);
    let second = write_dataset(dir.path(), "second.txt", &[10.0]);

    let mut test_sets = SuppliedTestSets::new();
    test_sets.register("train.txt", first.path());
    test_sets.register("train.txt", second.path());

    let report = RunController::new(SplitPolicy::SuppliedTestSet { test_sets })
        .with_seed(4)
        .with_parser(line_parser)
        .with_dataset(dataset("data/train.txt", &[1.0, 3.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.datasets, vec![first.clone(), second.clone()]);
    let loss_on = |file: &DatasetFile| {
        report
            .results_for(file)
            .next()
            .and_then(|r| r.loss("abs_error"))
            .and_then(LossValue::as_f64)
    };
    assert_eq!(loss_on(&first), Some(0.0));
    assert_eq!(loss_on(&second), Some(8.0));
    assert!(report.results.iter().all(|r| r.reduced_from == 1));
}

#[test]
fn unmapped_training_dataset_is_a_soft_failure() {
    let dir = tempfile::tempdir().unwrap();
    let test_file = write_dataset(dir.path(), "a_test.txt", &[1.0]);
    let mut test_sets = SuppliedTestSets::new();
    test_sets.register("a.txt", test_file.path());

    let report = RunController::new(SplitPolicy::SuppliedTestSet { test_sets })
        .with_parser(line_parser)
        .with_dataset(dataset("a.txt", &[1.0]))
        .with_dataset(dataset("b.txt", &[2.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.soft_failures.len(), 1);
    assert_eq!(report.soft_failures[0].stage, FailureStage::Split);
    assert_eq!(report.soft_failures[0].dataset, Some(DatasetFile::new("b.txt")));
}

#[test]
fn progress_is_reported_per_set() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let events = Arc::clone(&events);
        Arc::new(move |ev: ProgressEvent| events.lock().unwrap().push(ev))
    };
    RunController::new(kfold(2))
        .with_seed(1)
        .with_dataset(dataset("a.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_dataset(dataset("b.txt", &[1.0, 2.0, 3.0, 4.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .with_progress(sink)
        .run()
        .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            ProgressEvent { done: 1, total: 2 },
            ProgressEvent { done: 2, total: 2 },
        ]
    );
}

#[test]
fn invalid_policy_fails_before_any_work() {
    let err = RunController::new(kfold(0))
        .with_dataset(dataset("a.txt", &[1.0, 2.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap_err();
    assert!(matches!(err, EvalError::Config { .. }));
}

#[test]
fn controller_from_config_skips_unreadable_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_dataset(dir.path(), "good.txt", &[1.0, 2.0, 3.0, 4.0]);
    let missing = dir.path().join("missing.txt");
    let cfg_path = dir.path().join("eval.yaml");
    std::fs::write(
        &cfg_path,
        format!(
            "version: 1\nseed: 21\ndatasets:\n  - {}\n  - {}\nvalidation:\n  kind: k_fold\n  folds: 2\n",
            good.path().display(),
            missing.display()
        ),
    )
    .unwrap();

    let cfg = load_config(&cfg_path).unwrap();
    let ctl = RunController::<Ds, f64>::from_config(&cfg, Arc::new(line_parser)).unwrap();
    assert_eq!(ctl.datasets.len(), 1);
    assert_eq!(ctl.seed, Some(21));

    let report = ctl
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run()
        .unwrap();
    assert_eq!(report.datasets, vec![good]);
    assert_eq!(report.soft_failures.len(), 1);
    assert_eq!(report.soft_failures[0].stage, FailureStage::DatasetLoad);
    assert_eq!(
        report.soft_failures[0].dataset,
        Some(DatasetFile::new(&missing))
    );
}

#[derive(Default)]
struct RecordingSink {
    calls: RefCell<Vec<(usize, usize)>>,
}

impl ReportSink for RecordingSink {
    fn report(
        &self,
        datasets: &[DatasetFile],
        results: &[EvaluationResult],
    ) -> anyhow::Result<()> {
        self.calls.borrow_mut().push((datasets.len(), results.len()));
        Ok(())
    }
}

#[test]
fn report_sink_receives_accepted_results() {
    let sink = RecordingSink::default();
    let report = RunController::new(SplitPolicy::InSample)
        .with_seed(1)
        .with_dataset(dataset("a.txt", &[1.0, 3.0]))
        .with_dataset(dataset("b.txt", &[2.0]))
        .with_algorithm(MeanPredictor)
        .with_metric(AbsError)
        .run_and_report(&sink)
        .unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(*sink.calls.borrow(), vec![(2, 2)]);
}

#[test]
fn failed_run_never_reaches_the_sink() {
    let sink = RecordingSink::default();
    let err = RunController::new(SplitPolicy::InSample)
        .with_dataset(dataset("a.txt", &[1.0]))
        .with_algorithm(BrokenLearner)
        .with_metric(AbsError)
        .run_and_report(&sink)
        .unwrap_err();
    assert!(err.downcast_ref::<EvalError>().is_some());
    assert!(sink.calls.borrow().is_empty());
}
