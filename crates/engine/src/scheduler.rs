//! Speculative scheduler: race the scorers, keep the winner, cancel the rest.
//!
//! ## Algorithm
//! 1. Launch every scorer as its own task; a semaphore holds concurrency at
//!    the thread budget, so with fewer slots than scorers the rest queue
//! 2. The first scorer to complete is the primary; cancel everyone else
//! 3. If the primary alone fills `sufficiency_threshold` results, accept it
//! 4. Otherwise gather stragglers until they all finish or the straggler
//!    timeout passes, then aggregate everything gathered
//! 5. Final filter/dedup/sort/truncate
//!
//! A budget of 1 cannot race, so it runs the sequential baseline instead.
//!
//! ## State machine
//! `Pending -> Racing -> PrimaryReady -> (Done | AwaitingStragglers -> Done)`

use crate::aggregator::{finalize, Aggregator, RankedResult};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{ProgressSink, Stage};
use crate::sequential::run_sequential;
use catalog::Catalog;
use scorers::{ScoreContribution, Scorer, ScorerKind, ScorerRun, SelectionProfile};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// What a spawned scorer task hands back. The inner error is a panic or
/// abort of the blocking scorer body.
type TaskOutput = (ScorerKind, std::result::Result<ScorerRun, String>);

/// Lifecycle of one scheduling run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Pending,
    Racing,
    PrimaryReady,
    AwaitingStragglers,
    Done,
}

/// Counters describing how a run went
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    pub thread_budget: usize,
    pub elapsed_ms: f64,
    /// Contributions that fed the final aggregation
    pub contributions: usize,
    pub results: usize,
    pub scorers_completed: usize,
    pub scorers_cancelled: usize,
    /// First scorer to finish; `None` for sequential runs
    pub primary_scorer: Option<ScorerKind>,
    /// The primary result was sufficient on its own
    pub accepted_primary: bool,
    /// The straggler wait ran out before every task settled
    pub timed_out: bool,
}

/// Ranked results plus the metrics of the run that produced them
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub results: Vec<RankedResult>,
    pub metrics: RunMetrics,
}

/// Runs one recommendation computation under a thread budget
pub struct SpeculativeScheduler {
    scorers: Vec<Arc<dyn Scorer>>,
    config: EngineConfig,
    thread_budget: usize,
    progress: ProgressSink,
}

impl SpeculativeScheduler {
    pub fn new(scorers: Vec<Arc<dyn Scorer>>, config: EngineConfig, thread_budget: usize) -> Self {
        Self {
            scorers,
            config,
            thread_budget: thread_budget.max(1),
            progress: ProgressSink::disabled(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn thread_budget(&self) -> usize {
        self.thread_budget
    }

    /// Compute up to `max_results` recommendations for `profile`
    #[instrument(skip_all, fields(budget = self.thread_budget, max_results))]
    pub async fn run(
        &self,
        catalog: Arc<Catalog>,
        profile: Arc<SelectionProfile>,
        max_results: usize,
    ) -> Result<ScheduleOutcome> {
        let start = Instant::now();
        self.progress.status(
            Stage::Started,
            None,
            format!(
                "Scoring {} items with {} scorers (thread budget {})",
                catalog.len(),
                self.scorers.len(),
                self.thread_budget
            ),
        );

        let mut outcome = if self.thread_budget == 1 {
            self.run_serial(catalog, profile, max_results).await?
        } else {
            self.race(catalog, profile, max_results).await?
        };

        outcome.metrics.thread_budget = self.thread_budget;
        outcome.metrics.elapsed_ms = elapsed_ms(start);

        info!(
            "Produced {} recommendations in {:.2}ms (budget {})",
            outcome.results.len(),
            outcome.metrics.elapsed_ms,
            self.thread_budget
        );
        self.progress.status(
            Stage::Done,
            None,
            format!(
                "{} recommendations ready in {:.1}ms",
                outcome.results.len(),
                outcome.metrics.elapsed_ms
            ),
        );
        Ok(outcome)
    }

    async fn run_serial(
        &self,
        catalog: Arc<Catalog>,
        profile: Arc<SelectionProfile>,
        max_results: usize,
    ) -> Result<ScheduleOutcome> {
        let scorers = self.scorers.clone();
        let progress = self.progress.clone();

        tokio::task::spawn_blocking(move || {
            run_sequential(&scorers, &catalog, &profile, max_results, &progress)
        })
        .await
        .map_err(|e| EngineError::TaskFailed {
            scorer: "sequential".to_string(),
            reason: describe_join_error(e),
        })
    }

    async fn race(
        &self,
        catalog: Arc<Catalog>,
        profile: Arc<SelectionProfile>,
        max_results: usize,
    ) -> Result<ScheduleOutcome> {
        let mut state = SchedulerState::Pending;
        let mut metrics = RunMetrics::default();

        let cancel = CancellationToken::new();
        // Any early return (task failure) still stops the remaining scorers
        let _stop_on_exit = cancel.clone().drop_guard();

        let mut tasks = self.launch(&catalog, &profile, &cancel);
        self.transition(&mut state, SchedulerState::Racing);

        let mut primary = None;
        while let Some(joined) = tasks.join_next().await {
            let (kind, run) = self.settle(joined)?;
            match run {
                ScorerRun::Completed(contributions) => {
                    metrics.scorers_completed += 1;
                    primary = Some((kind, contributions));
                    break;
                }
                ScorerRun::Cancelled => metrics.scorers_cancelled += 1,
            }
        }

        let Some((primary_kind, primary_contributions)) = primary else {
            warn!("No scorer completed; returning an empty result");
            self.transition(&mut state, SchedulerState::Done);
            return Ok(ScheduleOutcome {
                results: Vec::new(),
                metrics,
            });
        };

        cancel.cancel();
        metrics.primary_scorer = Some(primary_kind);
        self.progress.recommendations(&primary_contributions);

        let aggregator = Aggregator::new(&catalog, &profile.selection);
        let primary_results = aggregator.aggregate(&primary_contributions, max_results);
        let threshold = self.config.sufficiency_threshold(max_results);
        self.transition(&mut state, SchedulerState::PrimaryReady);
        debug!(
            "{} scorer finished first with {} results (threshold {})",
            primary_kind,
            primary_results.len(),
            threshold
        );

        let mut gathered = primary_contributions;
        let merged = if primary_results.len() >= threshold {
            metrics.accepted_primary = true;
            // Losers only need reaping; whatever they produced is discarded
            self.collect(&mut tasks, &mut metrics, None).await?;
            primary_results
        } else {
            self.transition(&mut state, SchedulerState::AwaitingStragglers);
            self.collect(&mut tasks, &mut metrics, Some(&mut gathered)).await?;
            self.progress.status(
                Stage::Aggregating,
                None,
                format!("Combining {} contributions", gathered.len()),
            );
            aggregator.aggregate(&gathered, max_results)
        };

        let results = finalize(merged, max_results);
        metrics.contributions = gathered.len();
        metrics.results = results.len();
        self.transition(&mut state, SchedulerState::Done);

        Ok(ScheduleOutcome { results, metrics })
    }

    /// Spawn one task per scorer. Each waits for a budget slot, then scores
    /// on the blocking pool while holding it.
    fn launch(
        &self,
        catalog: &Arc<Catalog>,
        profile: &Arc<SelectionProfile>,
        cancel: &CancellationToken,
    ) -> JoinSet<TaskOutput> {
        let slots = Arc::new(Semaphore::new(self.thread_budget));
        let mut tasks = JoinSet::new();

        for scorer in &self.scorers {
            let scorer = Arc::clone(scorer);
            let catalog = Arc::clone(catalog);
            let profile = Arc::clone(profile);
            let slots = Arc::clone(&slots);
            let cancel = cancel.clone();
            let progress = self.progress.clone();

            tasks.spawn(async move {
                let kind = scorer.kind();

                // A queued scorer whose race is already decided never starts
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (kind, Ok(ScorerRun::Cancelled)),
                    permit = slots.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (kind, Ok(ScorerRun::Cancelled)),
                    },
                };

                progress.status(Stage::ScorerStarted, Some(kind), format!("{} scorer started", kind));
                let joined = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    scorer.score(&catalog, &profile, &cancel)
                })
                .await;

                (kind, joined.map_err(describe_join_error))
            });
        }

        tasks
    }

    /// Wait for the remaining tasks until they settle or the straggler
    /// timeout passes. Completed work lands in `sink` when one is given.
    async fn collect(
        &self,
        tasks: &mut JoinSet<TaskOutput>,
        metrics: &mut RunMetrics,
        mut sink: Option<&mut Vec<ScoreContribution>>,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.straggler_timeout();

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(joined)) => {
                    let (_, run) = self.settle(joined)?;
                    match run {
                        ScorerRun::Completed(contributions) => {
                            metrics.scorers_completed += 1;
                            if let Some(gathered) = sink.as_deref_mut() {
                                self.progress.recommendations(&contributions);
                                gathered.extend(contributions);
                            }
                        }
                        ScorerRun::Cancelled => metrics.scorers_cancelled += 1,
                    }
                }
                Ok(None) => return Ok(()),
                Err(_) => {
                    warn!(
                        "Straggler timeout of {:?} reached with {} scorers outstanding",
                        self.config.straggler_timeout(),
                        tasks.len()
                    );
                    metrics.timed_out = true;
                    metrics.scorers_cancelled += tasks.len();
                    tasks.abort_all();
                    return Ok(());
                }
            }
        }
    }

    /// Unwrap a joined task, turning panics into `TaskFailed`
    fn settle(&self, joined: std::result::Result<TaskOutput, JoinError>) -> Result<(ScorerKind, ScorerRun)> {
        let (kind, run) = joined.map_err(|e| EngineError::TaskFailed {
            scorer: "scheduler".to_string(),
            reason: describe_join_error(e),
        })?;
        let run = run.map_err(|reason| EngineError::TaskFailed {
            scorer: kind.name().to_string(),
            reason,
        })?;

        match &run {
            ScorerRun::Completed(contributions) => {
                debug!("{} scorer completed with {} contributions", kind, contributions.len());
                self.progress.status(
                    Stage::ScorerCompleted,
                    Some(kind),
                    format!("{} scorer finished with {} candidates", kind, contributions.len()),
                );
            }
            ScorerRun::Cancelled => {
                debug!("{} scorer cancelled", kind);
                self.progress
                    .status(Stage::ScorerCancelled, Some(kind), format!("{} scorer cancelled", kind));
            }
        }
        Ok((kind, run))
    }

    fn transition(&self, state: &mut SchedulerState, next: SchedulerState) {
        debug!("Scheduler {:?} -> {:?}", state, next);
        *state = next;
        match next {
            SchedulerState::PrimaryReady => {
                self.progress
                    .status(Stage::PrimaryReady, None, "First scorer finished, others cancelled")
            }
            SchedulerState::AwaitingStragglers => self.progress.status(
                Stage::AwaitingStragglers,
                None,
                format!(
                    "Primary result too small, waiting up to {}ms for other scorers",
                    self.config.straggler_timeout_ms
                ),
            ),
            _ => {}
        }
    }
}

/// Milliseconds since `start`, with sub-millisecond precision
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    duration_ms(start.elapsed())
}

pub(crate) fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

pub(crate) fn describe_join_error(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        if let Some(message) = payload.downcast_ref::<&str>() {
            return format!("panicked: {}", message);
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return format!("panicked: {}", message);
        }
        return "panicked".to_string();
    }
    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogItem, SelectionSet};
    use scorers::{build_selection_profile, default_scorers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_test_catalog() -> Catalog {
        (1..=12)
            .map(|id| {
                let genre = if id % 2 == 0 { "Drama" } else { "Comedy" };
                CatalogItem::new(id, format!("Item {}", id), 7.0 + f64::from(id % 3), 1990 + id as u16, 100 + id)
                    .with_genres([genre])
            })
            .collect()
    }

    fn inputs(ids: &[u32]) -> (Arc<Catalog>, Arc<SelectionProfile>) {
        let catalog = create_test_catalog();
        let profile = build_selection_profile(&catalog, &SelectionSet::new(ids.iter().copied())).unwrap();
        (Arc::new(catalog), Arc::new(profile))
    }

    /// Finishes immediately with a fixed contribution list
    struct Fixed(ScorerKind, Vec<ScoreContribution>);

    impl Scorer for Fixed {
        fn kind(&self) -> ScorerKind {
            self.0
        }

        fn score(&self, _: &Catalog, _: &SelectionProfile, _: &CancellationToken) -> ScorerRun {
            ScorerRun::Completed(self.1.clone())
        }
    }

    /// Sleeps in small steps until cancelled or the delay passes
    struct Slow(ScorerKind, Duration, Vec<ScoreContribution>);

    impl Scorer for Slow {
        fn kind(&self) -> ScorerKind {
            self.0
        }

        fn score(&self, _: &Catalog, _: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
            let start = Instant::now();
            while start.elapsed() < self.1 {
                if cancel.is_cancelled() {
                    return ScorerRun::Cancelled;
                }
                std::thread::sleep(Duration::from_millis(2));
            }
            ScorerRun::Completed(self.2.clone())
        }
    }

    /// Sleeps for the full delay regardless of cancellation
    struct Delayed(ScorerKind, Duration, Vec<ScoreContribution>);

    impl Scorer for Delayed {
        fn kind(&self) -> ScorerKind {
            self.0
        }

        fn score(&self, _: &Catalog, _: &SelectionProfile, _: &CancellationToken) -> ScorerRun {
            std::thread::sleep(self.1);
            ScorerRun::Completed(self.2.clone())
        }
    }

    /// Records how many scorers are inside `score` at the same time
    struct Counting {
        kind: ScorerKind,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Scorer for Counting {
        fn kind(&self) -> ScorerKind {
            self.kind
        }

        fn score(&self, _: &Catalog, _: &SelectionProfile, _: &CancellationToken) -> ScorerRun {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(30));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ScorerRun::Completed(contributions(self.kind, &[2 + self.kind as u32]))
        }
    }

    fn contributions(kind: ScorerKind, ids: &[u32]) -> Vec<ScoreContribution> {
        ids.iter()
            .map(|&id| ScoreContribution::new(id, f64::from(id), "fixed", kind))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sufficient_primary_is_accepted() {
        let (catalog, profile) = inputs(&[1]);
        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, contributions(ScorerKind::Genre, &[2, 3, 4, 5, 6]))),
            Arc::new(Slow(
                ScorerKind::Rating,
                Duration::from_secs(5),
                contributions(ScorerKind::Rating, &[7]),
            )),
        ];
        let scheduler = SpeculativeScheduler::new(scorers, EngineConfig::default(), 4);

        let outcome = scheduler.run(catalog, profile, 10).await.unwrap();

        assert!(outcome.metrics.accepted_primary);
        assert_eq!(outcome.metrics.primary_scorer, Some(ScorerKind::Genre));
        assert_eq!(outcome.metrics.scorers_cancelled, 1);
        let ids: Vec<u32> = outcome.results.iter().map(|r| r.item_id()).collect();
        assert_eq!(ids, vec![6, 5, 4, 3, 2]);
        // The slow scorer saw the cancellation well before its 5s delay
        assert!(outcome.metrics.elapsed_ms < 4000.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_insufficient_primary_waits_for_stragglers() {
        let (catalog, profile) = inputs(&[1]);
        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, contributions(ScorerKind::Genre, &[2]))),
            Arc::new(Slow(
                ScorerKind::Tag,
                Duration::from_millis(50),
                contributions(ScorerKind::Tag, &[3, 4]),
            )),
        ];
        let config = EngineConfig::default().with_sufficiency_ratio(1.0);
        let scheduler = SpeculativeScheduler::new(scorers, config, 4);

        let outcome = scheduler.run(catalog, profile, 10).await.unwrap();

        assert!(!outcome.metrics.accepted_primary);
        assert_eq!(outcome.metrics.primary_scorer, Some(ScorerKind::Genre));
        // The slow scorer was cancelled mid-sleep, so only the primary remains
        assert!(outcome.results.iter().any(|r| r.item_id() == 2));
        assert!(!outcome.metrics.timed_out);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_stragglers_are_merged() {
        let (catalog, profile) = inputs(&[1]);
        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, contributions(ScorerKind::Genre, &[2]))),
            Arc::new(Delayed(
                ScorerKind::Tag,
                Duration::from_millis(50),
                contributions(ScorerKind::Tag, &[3]),
            )),
        ];
        let scheduler = SpeculativeScheduler::new(scorers, EngineConfig::default(), 4);

        let outcome = scheduler.run(catalog, profile, 10).await.unwrap();

        assert!(!outcome.metrics.accepted_primary);
        assert!(!outcome.metrics.timed_out);
        assert_eq!(outcome.metrics.primary_scorer, Some(ScorerKind::Genre));
        assert_eq!(outcome.metrics.scorers_completed, 2);
        assert_eq!(outcome.metrics.contributions, 2);
        let ids: Vec<u32> = outcome.results.iter().map(|r| r.item_id()).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_empty_primary_is_never_sufficient() {
        let (catalog, profile) = inputs(&[1]);
        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, Vec::new())),
            Arc::new(Delayed(
                ScorerKind::Rating,
                Duration::from_millis(50),
                contributions(ScorerKind::Rating, &[2]),
            )),
        ];
        let scheduler = SpeculativeScheduler::new(scorers, EngineConfig::default(), 4);

        let outcome = scheduler.run(catalog, profile, 1).await.unwrap();

        assert!(!outcome.metrics.accepted_primary);
        assert_eq!(outcome.metrics.primary_scorer, Some(ScorerKind::Genre));
        let ids: Vec<u32> = outcome.results.iter().map(|r| r.item_id()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_odd_result_count_rounds_threshold_up() {
        let (catalog, profile) = inputs(&[1]);
        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, contributions(ScorerKind::Genre, &[2]))),
            Arc::new(Delayed(
                ScorerKind::Tag,
                Duration::from_millis(50),
                contributions(ScorerKind::Tag, &[3, 4]),
            )),
        ];
        let scheduler = SpeculativeScheduler::new(scorers, EngineConfig::default(), 4);

        // One result out of three is below half, so the straggler is merged
        let outcome = scheduler.run(catalog, profile, 3).await.unwrap();

        assert!(!outcome.metrics.accepted_primary);
        let ids: Vec<u32> = outcome.results.iter().map(|r| r.item_id()).collect();
        assert_eq!(ids, vec![4, 3, 2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_budget_caps_concurrent_scorers() {
        let (catalog, profile) = inputs(&[1]);

        for budget in [2, 3] {
            let in_flight = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let scorers: Vec<Arc<dyn Scorer>> = ScorerKind::ALL
                .iter()
                .map(|&kind| {
                    Arc::new(Counting {
                        kind,
                        in_flight: Arc::clone(&in_flight),
                        peak: Arc::clone(&peak),
                    }) as Arc<dyn Scorer>
                })
                .collect();
            let config = EngineConfig::default().with_sufficiency_ratio(1.0);
            let scheduler = SpeculativeScheduler::new(scorers, config, budget);

            let outcome = scheduler
                .run(Arc::clone(&catalog), Arc::clone(&profile), 10)
                .await
                .unwrap();

            let peak = peak.load(Ordering::SeqCst);
            assert!((1..=budget).contains(&peak), "budget {} reached {} at once", budget, peak);
            assert_eq!(in_flight.load(Ordering::SeqCst), 0);
            // Queued scorers settle as cancelled rather than failing the run
            assert_eq!(
                outcome.metrics.scorers_completed + outcome.metrics.scorers_cancelled,
                ScorerKind::ALL.len()
            );
            assert!(!outcome.results.is_empty());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_straggler_timeout_bounds_the_wait() {
        let (catalog, profile) = inputs(&[1]);

        /// Ignores cancellation entirely
        struct Stubborn;
        impl Scorer for Stubborn {
            fn kind(&self) -> ScorerKind {
                ScorerKind::Duration
            }
            fn score(&self, _: &Catalog, _: &SelectionProfile, _: &CancellationToken) -> ScorerRun {
                std::thread::sleep(Duration::from_millis(800));
                ScorerRun::Completed(Vec::new())
            }
        }

        let scorers: Vec<Arc<dyn Scorer>> = vec![
            Arc::new(Fixed(ScorerKind::Genre, contributions(ScorerKind::Genre, &[2]))),
            Arc::new(Stubborn),
        ];
        let config = EngineConfig::default()
            .with_sufficiency_ratio(1.0)
            .with_straggler_timeout(Duration::from_millis(50));
        let scheduler = SpeculativeScheduler::new(scorers, config, 4);

        let outcome = scheduler.run(catalog, profile, 10).await.unwrap();

        assert!(outcome.metrics.timed_out);
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.metrics.elapsed_ms < 700.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_scorer_fails_the_run() {
        let (catalog, profile) = inputs(&[1]);

        struct Exploding;
        impl Scorer for Exploding {
            fn kind(&self) -> ScorerKind {
                ScorerKind::Recency
            }
            fn score(&self, _: &Catalog, _: &SelectionProfile, _: &CancellationToken) -> ScorerRun {
                panic!("boom");
            }
        }

        let scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(Exploding)];
        let scheduler = SpeculativeScheduler::new(scorers, EngineConfig::default(), 2);

        let err = scheduler.run(catalog, profile, 10).await.unwrap_err();
        match err {
            EngineError::TaskFailed { scorer, reason } => {
                assert_eq!(scorer, "Year");
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_budget_one_runs_sequentially() {
        let (catalog, profile) = inputs(&[2, 4]);
        let scheduler = SpeculativeScheduler::new(default_scorers(), EngineConfig::default(), 1);

        let outcome = scheduler.run(Arc::clone(&catalog), Arc::clone(&profile), 5).await.unwrap();
        let baseline = run_sequential(&default_scorers(), &catalog, &profile, 5, &ProgressSink::disabled());

        assert_eq!(outcome.metrics.scorers_completed, 5);
        assert_eq!(outcome.metrics.primary_scorer, None);
        assert!(crate::aggregator::tests::same_ranking(&outcome.results, &baseline.results, 1e-9));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_scorers_yields_empty_result() {
        let (catalog, profile) = inputs(&[1]);
        let scheduler = SpeculativeScheduler::new(Vec::new(), EngineConfig::default(), 4);

        let outcome = scheduler.run(catalog, profile, 10).await.unwrap();
        assert!(outcome.results.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_results_never_include_selection() {
        let (catalog, profile) = inputs(&[2, 3, 4]);
        let scheduler = SpeculativeScheduler::new(default_scorers(), EngineConfig::default(), 4);

        let outcome = scheduler.run(catalog, profile, 5).await.unwrap();

        assert!(outcome.results.len() <= 5);
        assert!(outcome.results.iter().all(|r| ![2, 3, 4].contains(&r.item_id())));
    }
}
