//! Sequential baseline: the five scorers one after another.
//!
//! No concurrency and no cancellation. This is the reference the benchmark
//! measures speedup against, and the path a thread budget of 1 collapses to.

use crate::aggregator::{finalize, Aggregator};
use crate::events::{ProgressSink, Stage};
use crate::scheduler::{elapsed_ms, RunMetrics, ScheduleOutcome};
use catalog::Catalog;
use scorers::{Scorer, ScorerRun, SelectionProfile};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Run every scorer to completion in order and aggregate the lot
#[instrument(skip_all, fields(scorers = scorers.len(), max_results))]
pub fn run_sequential(
    scorers: &[Arc<dyn Scorer>],
    catalog: &Catalog,
    profile: &SelectionProfile,
    max_results: usize,
    progress: &ProgressSink,
) -> ScheduleOutcome {
    let start = Instant::now();
    // Never cancelled: the baseline always does the full amount of work
    let never = CancellationToken::new();

    let mut metrics = RunMetrics {
        thread_budget: 1,
        ..RunMetrics::default()
    };
    let mut gathered = Vec::new();

    for scorer in scorers {
        let kind = scorer.kind();
        progress.status(Stage::ScorerStarted, Some(kind), format!("{} scorer started", kind));

        match scorer.score(catalog, profile, &never) {
            ScorerRun::Completed(contributions) => {
                debug!("{} scorer produced {} contributions", kind, contributions.len());
                metrics.scorers_completed += 1;
                progress.status(
                    Stage::ScorerCompleted,
                    Some(kind),
                    format!("{} scorer finished with {} candidates", kind, contributions.len()),
                );
                progress.recommendations(&contributions);
                gathered.extend(contributions);
            }
            ScorerRun::Cancelled => metrics.scorers_cancelled += 1,
        }
    }

    progress.status(Stage::Aggregating, None, "Combining and filtering results");
    let aggregated = Aggregator::new(catalog, &profile.selection).aggregate(&gathered, max_results);
    let results = finalize(aggregated, max_results);

    metrics.contributions = gathered.len();
    metrics.results = results.len();
    metrics.elapsed_ms = elapsed_ms(start);

    ScheduleOutcome { results, metrics }
}
