//! # Recommendation Engine
//!
//! The entry point callers use. It coordinates one request end to end:
//! 1. Resolve the catalog and selection
//! 2. Build the selection profile (rejects empty selections)
//! 3. Hand the scorers to the speculative scheduler (or the sequential
//!    baseline, or the benchmark harness)
//! 4. Return ranked results
//!
//! The catalog is shared read-only with every scorer task through an `Arc`.

use std::sync::Arc;

use tracing::{info, instrument};

use catalog::{Catalog, CatalogSupplier, ItemId, SelectionSet};
use scorers::{build_selection_profile, default_scorers, Scorer};

use crate::aggregator::RankedResult;
use crate::benchmark::{BenchmarkHarness, BenchmarkReport};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::ProgressSink;
use crate::scheduler::{ScheduleOutcome, SpeculativeScheduler};
use crate::sequential::run_sequential;

/// Combines the scorers under a configurable execution strategy
#[derive(Clone)]
pub struct RecommendationEngine {
    config: EngineConfig,
    scorers: Vec<Arc<dyn Scorer>>,
    progress: ProgressSink,
}

impl RecommendationEngine {
    /// Create an engine with the five default scorers
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scorers: default_scorers(),
            progress: ProgressSink::disabled(),
        })
    }

    /// Replace the scorer set (custom parameters, extra heuristics)
    pub fn with_scorers(mut self, scorers: Vec<Arc<dyn Scorer>>) -> Self {
        self.scorers = scorers;
        self
    }

    /// Publish status and recommendation events to `progress`
    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Up to `max_results` recommendations for `selection`.
    ///
    /// # Arguments
    /// * `catalog` - Read-only catalog snapshot
    /// * `selection` - Items the user picked; never recommended back
    /// * `max_results` - Upper bound on the result size
    /// * `thread_budget` - Concurrent scorer cap; `None` uses the configured
    ///   budget, falling back to the hardware unit count
    pub async fn recommend(
        &self,
        catalog: Arc<Catalog>,
        selection: &SelectionSet,
        max_results: usize,
        thread_budget: Option<usize>,
    ) -> Result<Vec<RankedResult>> {
        let outcome = self
            .recommend_with_metrics(catalog, selection, max_results, thread_budget)
            .await?;
        Ok(outcome.results)
    }

    /// Same as `recommend`, also reporting how the run went
    #[instrument(skip_all, fields(selection = selection.len(), max_results))]
    pub async fn recommend_with_metrics(
        &self,
        catalog: Arc<Catalog>,
        selection: &SelectionSet,
        max_results: usize,
        thread_budget: Option<usize>,
    ) -> Result<ScheduleOutcome> {
        let budget = self.resolve_budget(thread_budget)?;
        let profile = Arc::new(build_selection_profile(&catalog, selection)?);
        info!(
            "Recommending from {} items for {} selected (budget {})",
            catalog.len(),
            selection.len(),
            budget
        );

        SpeculativeScheduler::new(self.scorers.clone(), self.config.clone(), budget)
            .with_progress(self.progress.clone())
            .run(catalog, profile, max_results)
            .await
    }

    /// Every scorer to completion, one after another, on the calling thread
    pub fn recommend_sequential(
        &self,
        catalog: &Catalog,
        selection: &SelectionSet,
        max_results: usize,
    ) -> Result<Vec<RankedResult>> {
        let profile = build_selection_profile(catalog, selection)?;
        let outcome = run_sequential(&self.scorers, catalog, &profile, max_results, &self.progress);
        Ok(outcome.results)
    }

    /// Load the catalog from `supplier`, resolve `ids` and recommend.
    ///
    /// Supplier failures reach the caller unchanged.
    pub async fn recommend_from(
        &self,
        supplier: &dyn CatalogSupplier,
        ids: &[ItemId],
        max_results: usize,
        thread_budget: Option<usize>,
    ) -> Result<Vec<RankedResult>> {
        let catalog = supplier.load().map_err(EngineError::Catalog)?;
        let selection = catalog.resolve_selection(ids)?;
        self.recommend(Arc::new(catalog), &selection, max_results, thread_budget)
            .await
    }

    /// Run the speedup/efficiency sweep for `selection`
    #[instrument(skip_all, fields(selection = selection.len()))]
    pub async fn benchmark(&self, catalog: Arc<Catalog>, selection: &SelectionSet) -> Result<BenchmarkReport> {
        let profile = Arc::new(build_selection_profile(&catalog, selection)?);
        BenchmarkHarness::new(self.scorers.clone(), self.config.clone())
            .run(catalog, profile)
            .await
    }

    fn resolve_budget(&self, requested: Option<usize>) -> Result<usize> {
        let budget = requested.unwrap_or_else(|| self.config.resolved_thread_budget());
        if budget == 0 {
            return Err(EngineError::InvalidConfig(
                "thread budget must be at least 1".to_string(),
            ));
        }
        Ok(budget)
    }
}
