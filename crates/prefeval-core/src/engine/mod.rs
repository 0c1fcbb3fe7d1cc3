//! Run controller: drives splitting, training, scoring and reduction for a
//! whole run and decides whether the run as a whole succeeded.
//!
//! One pass per run: `Init -> BuildSets -> RunSets -> Validate -> Report`,
//! or `Fatal` when nothing survives validation. Failures below the run level
//! are recorded as [`SoftFailure`]s and never abort the pass.

mod build;
mod execute;

use crate::config::EvalConfig;
use crate::dataset::{Dataset, DatasetFile, DatasetParser};
use crate::errors::{EvalError, EvalResult, SoftFailure};
use crate::report::progress::{logging_progress_sink, ProgressSink};
use crate::report::{distinct_datasets, ReportSink, RunReport};
use crate::setting::{Algorithm, Metric};
use crate::split::SplitPolicy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    BuildSets,
    RunSets,
    Validate,
    Report,
    Fatal,
}

impl RunPhase {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::BuildSets)
                | (Self::Init, Self::Fatal)
                | (Self::BuildSets, Self::RunSets)
                | (Self::RunSets, Self::Validate)
                | (Self::Validate, Self::Report)
                | (Self::Validate, Self::Fatal)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::BuildSets => "build_sets",
            Self::RunSets => "run_sets",
            Self::Validate => "validate",
            Self::Report => "report",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    debug_assert!(phase.can_advance_to(next), "{phase} -> {next}");
    tracing::info!(from = %phase, to = %next, "run phase");
    *phase = next;
}

fn missing_parser<D: Dataset>(file: &DatasetFile) -> EvalResult<D> {
    Err(EvalError::config(format!(
        "no dataset parser configured to read {file}"
    )))
}

/// Evaluates every algorithm on every dataset under one split policy.
pub struct RunController<D: Dataset, M> {
    pub policy: SplitPolicy,
    pub datasets: Vec<D>,
    pub algorithms: Vec<Arc<dyn Algorithm<D, M>>>,
    pub metrics: Vec<Arc<dyn Metric<D, M>>>,
    /// Fixed seed; a fresh one is generated and logged when absent.
    pub seed: Option<u64>,
    pub parser: Option<Arc<dyn DatasetParser<D>>>,
    /// Progress callback; progress is logged at info level when absent.
    pub progress: Option<ProgressSink>,
    /// Failures recorded before the run started (e.g. unreadable datasets).
    load_failures: Vec<SoftFailure>,
}

impl<D: Dataset, M> RunController<D, M> {
    pub fn new(policy: SplitPolicy) -> Self {
        Self {
            policy,
            datasets: Vec::new(),
            algorithms: Vec::new(),
            metrics: Vec::new(),
            seed: None,
            parser: None,
            progress: None,
            load_failures: Vec::new(),
        }
    }

    /// Builds a controller from validated configuration, loading every
    /// configured dataset with `parser`. Unreadable datasets are dropped and
    /// recorded as soft failures.
    pub fn from_config(cfg: &EvalConfig, parser: Arc<dyn DatasetParser<D>>) -> EvalResult<Self> {
        cfg.validate()?;
        let mut ctl = Self::new(cfg.validation.clone());
        ctl.seed = cfg.seed;
        for file in cfg.dataset_files() {
            match parser.parse(&file) {
                Ok(dataset) => ctl.datasets.push(dataset),
                Err(e) => {
                    let e = match e {
                        e @ EvalError::DatasetLoad { .. } => e,
                        other => EvalError::DatasetLoad {
                            path: file.path().to_path_buf(),
                            message: other.to_string(),
                        },
                    };
                    tracing::warn!(dataset = %file, error = %e, "dataset skipped");
                    ctl.load_failures
                        .push(SoftFailure::new(e.stage(), e.to_string()).with_dataset(&file));
                }
            }
        }
        ctl.parser = Some(parser);
        Ok(ctl)
    }

    pub fn with_dataset(mut self, dataset: D) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn with_algorithm(mut self, algorithm: impl Algorithm<D, M> + 'static) -> Self {
        self.algorithms.push(Arc::new(algorithm));
        self
    }

    pub fn with_metric(mut self, metric: impl Metric<D, M> + 'static) -> Self {
        self.metrics.push(Arc::new(metric));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parser(mut self, parser: impl DatasetParser<D> + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Runs the whole evaluation. The only error surfaced is
    /// [`EvalError::RunProducedNoResults`] (or an invalid policy).
    pub fn run(&self) -> EvalResult<RunReport> {
        let mut phase = RunPhase::Init;
        if let Err(e) = self.policy.validate() {
            advance(&mut phase, RunPhase::Fatal);
            return Err(e);
        }

        let seed = self.seed.unwrap_or_else(|| {
            let s = rand::random();
            tracing::info!(seed = s, "no seed provided, using generated seed");
            s
        });
        let mut rng = StdRng::seed_from_u64(seed);
        let mut soft = self.load_failures.clone();
        tracing::info!(
            seed,
            policy = %self.policy,
            datasets = self.datasets.len(),
            algorithms = self.algorithms.len(),
            metrics = self.metrics.len(),
            "starting run"
        );

        advance(&mut phase, RunPhase::BuildSets);
        let fallback = missing_parser::<D>;
        let parser: &dyn DatasetParser<D> = match &self.parser {
            Some(p) => p.as_ref(),
            None => &fallback,
        };
        let sets = build::build_sets(self, &mut rng, parser, &mut soft);

        advance(&mut phase, RunPhase::RunSets);
        let default_progress;
        let progress = match &self.progress {
            Some(sink) => Some(sink),
            None => {
                default_progress = logging_progress_sink(sets.len());
                default_progress.as_ref()
            }
        };
        let combined = execute::run_sets(sets, progress, &mut soft);

        advance(&mut phase, RunPhase::Validate);
        let accepted = execute::accept_valid(combined, &mut soft);
        if accepted.is_empty() {
            advance(&mut phase, RunPhase::Fatal);
            tracing::error!(failures = soft.len(), "run produced no results");
            return Err(EvalError::RunProducedNoResults {
                failures: soft.len(),
            });
        }

        advance(&mut phase, RunPhase::Report);
        Ok(RunReport {
            seed,
            policy: self.policy.clone(),
            datasets: distinct_datasets(&accepted),
            results: accepted,
            soft_failures: soft,
        })
    }

    /// Runs the evaluation and hands the outcome to `sink`.
    pub fn run_and_report(&self, sink: &dyn ReportSink) -> anyhow::Result<RunReport> {
        let report = self.run()?;
        sink.report(&report.datasets, &report.results)?;
        Ok(report)
    }
}
