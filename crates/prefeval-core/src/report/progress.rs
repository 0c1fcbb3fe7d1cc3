//! Progress reporting for runs. The run controller emits done/total after
//! each set has been reduced; callers consume it through a sink.

use std::sync::Arc;

/// One progress update: how many sets are done and the total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. The run controller calls this each time a set completes.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// For large runs, emit at most every this many sets (10% step).
pub(crate) fn progress_step(total: usize) -> usize {
    if total <= 10 {
        1
    } else {
        std::cmp::max(1, total / 10)
    }
}

/// Sink that logs progress at info level, throttled to roughly 10% steps.
/// Returns `None` for runs with at most one set.
pub fn logging_progress_sink(total: usize) -> Option<ProgressSink> {
    if total <= 1 {
        return None;
    }
    let step = progress_step(total);
    Some(Arc::new(move |ev: ProgressEvent| {
        if ev.done == ev.total || ev.done == 1 || ev.done.is_multiple_of(step) {
            tracing::info!(done = ev.done, total = ev.total, "sets evaluated");
        }
    }))
}
