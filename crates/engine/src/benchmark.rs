//! Speedup and efficiency measurement.
//!
//! ## Algorithm
//! 1. Time the sequential baseline once; every sample reuses it
//! 2. Candidate budgets: the configured list (default {1, 2, 4, 8}) plus the
//!    hardware unit count when it is larger than 8, minus anything above the
//!    hardware unit count
//! 3. Per budget: time the speculative path (median over the configured
//!    repetitions), speedup = baseline / parallel, efficiency =
//!    speedup / budget clamped to 1.0
//!
//! Zero or non-finite timings give a speedup of 1.0 instead of dividing by
//! zero. Progress streams are off while measuring.

use crate::config::{hardware_units, EngineConfig};
use crate::error::{EngineError, Result};
use crate::events::ProgressSink;
use crate::scheduler::{describe_join_error, duration_ms, SpeculativeScheduler};
use crate::sequential::run_sequential;
use catalog::Catalog;
use scorers::{Scorer, SelectionProfile};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Hardware unit counts above this join the candidate list
const HARDWARE_THRESHOLD: usize = 8;

/// One row of the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkSample {
    pub threads: usize,
    pub baseline_ms: f64,
    pub parallel_ms: f64,
    pub speedup: f64,
    pub efficiency: f64,
}

impl BenchmarkSample {
    /// Derive speedup and efficiency from raw timings
    pub fn from_timings(threads: usize, baseline_ms: f64, parallel_ms: f64) -> Self {
        let speedup = speedup(baseline_ms, parallel_ms);
        let efficiency = (speedup / threads.max(1) as f64).clamp(0.0, 1.0);
        Self {
            threads,
            baseline_ms,
            parallel_ms,
            speedup,
            efficiency,
        }
    }
}

fn speedup(baseline_ms: f64, parallel_ms: f64) -> f64 {
    let measurable = |t: f64| t.is_finite() && t > 0.0;
    if !measurable(baseline_ms) || !measurable(parallel_ms) {
        return 1.0;
    }
    let ratio = baseline_ms / parallel_ms;
    if ratio.is_finite() { ratio } else { 1.0 }
}

/// Thread budgets to try on a machine with `hardware` execution units
pub fn candidate_budgets(base: &[usize], hardware: usize) -> Vec<usize> {
    let mut budgets: Vec<usize> = base.to_vec();
    if hardware > HARDWARE_THRESHOLD && !budgets.contains(&hardware) {
        budgets.push(hardware);
    }
    budgets.retain(|&b| b >= 1 && b <= hardware);
    budgets.sort_unstable();
    budgets.dedup();
    budgets
}

/// Full measurement sweep
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub hardware_units: usize,
    pub catalog_size: usize,
    pub selection_size: usize,
    pub baseline_ms: f64,
    pub samples: Vec<BenchmarkSample>,
}

impl BenchmarkReport {
    /// Highest speedup; the smallest budget wins ties
    pub fn best_speedup(&self) -> Option<&BenchmarkSample> {
        self.samples
            .iter()
            .reduce(|best, s| if s.speedup > best.speedup { s } else { best })
    }

    /// Highest efficiency; the smallest budget wins ties
    pub fn best_efficiency(&self) -> Option<&BenchmarkSample> {
        self.samples
            .iter()
            .reduce(|best, s| if s.efficiency > best.efficiency { s } else { best })
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Hardware units: {} | Catalog: {} items | Selection: {} items",
            self.hardware_units, self.catalog_size, self.selection_size
        )?;
        writeln!(f, "Sequential baseline: {:.2} ms", self.baseline_ms)?;
        writeln!(f)?;
        writeln!(f, "| Threads | Parallel (ms) | Speedup | Efficiency |")?;
        writeln!(f, "|---------|---------------|---------|------------|")?;
        for sample in &self.samples {
            writeln!(
                f,
                "| {:>7} | {:>13.2} | {:>6.2}x | {:>9.1}% |",
                sample.threads,
                sample.parallel_ms,
                sample.speedup,
                sample.efficiency * 100.0
            )?;
        }

        if let Some(best) = self.best_speedup() {
            writeln!(f)?;
            writeln!(f, "Best speedup: {:.2}x with {} threads", best.speedup, best.threads)?;
        }
        if let Some(best) = self.best_efficiency() {
            writeln!(
                f,
                "Best efficiency: {:.1}% with {} threads",
                best.efficiency * 100.0,
                best.threads
            )?;
        }
        Ok(())
    }
}

/// Drives the baseline and the speculative path across thread budgets
pub struct BenchmarkHarness {
    scorers: Vec<Arc<dyn Scorer>>,
    config: EngineConfig,
    hardware_units: usize,
}

impl BenchmarkHarness {
    pub fn new(scorers: Vec<Arc<dyn Scorer>>, config: EngineConfig) -> Self {
        Self {
            scorers,
            config,
            hardware_units: hardware_units(),
        }
    }

    /// Override the detected hardware unit count
    pub fn with_hardware_units(mut self, units: usize) -> Self {
        self.hardware_units = units.max(1);
        self
    }

    pub fn candidate_budgets(&self) -> Vec<usize> {
        candidate_budgets(&self.config.benchmark_budgets, self.hardware_units)
    }

    #[instrument(skip_all, fields(hardware = self.hardware_units))]
    pub async fn run(&self, catalog: Arc<Catalog>, profile: Arc<SelectionProfile>) -> Result<BenchmarkReport> {
        let max_results = self.config.max_results;
        let baseline_ms = self.time_baseline(&catalog, &profile, max_results).await?;
        info!("Sequential baseline: {:.2}ms", baseline_ms);

        let mut samples = Vec::new();
        for threads in self.candidate_budgets() {
            let scheduler = SpeculativeScheduler::new(self.scorers.clone(), self.config.clone(), threads);

            let mut timings = Vec::with_capacity(self.config.benchmark_repetitions);
            for _ in 0..self.config.benchmark_repetitions.max(1) {
                let start = Instant::now();
                scheduler
                    .run(Arc::clone(&catalog), Arc::clone(&profile), max_results)
                    .await?;
                timings.push(duration_ms(start.elapsed()));
            }

            let sample = BenchmarkSample::from_timings(threads, baseline_ms, median(&mut timings));
            debug!(
                "{} threads: {:.2}ms, speedup {:.2}x, efficiency {:.1}%",
                threads,
                sample.parallel_ms,
                sample.speedup,
                sample.efficiency * 100.0
            );
            samples.push(sample);
        }

        Ok(BenchmarkReport {
            hardware_units: self.hardware_units,
            catalog_size: catalog.len(),
            selection_size: profile.selection.len(),
            baseline_ms,
            samples,
        })
    }

    async fn time_baseline(
        &self,
        catalog: &Arc<Catalog>,
        profile: &Arc<SelectionProfile>,
        max_results: usize,
    ) -> Result<f64> {
        let scorers = self.scorers.clone();
        let catalog = Arc::clone(catalog);
        let profile = Arc::clone(profile);

        tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            run_sequential(&scorers, &catalog, &profile, max_results, &ProgressSink::disabled());
            duration_ms(start.elapsed())
        })
        .await
        .map_err(|e| EngineError::TaskFailed {
            scorer: "sequential".to_string(),
            reason: describe_join_error(e),
        })
    }
}

fn median(timings: &mut [f64]) -> f64 {
    if timings.is_empty() {
        return 0.0;
    }
    timings.sort_by(|a, b| a.total_cmp(b));
    let mid = timings.len() / 2;
    if timings.len() % 2 == 0 {
        (timings[mid - 1] + timings[mid]) / 2.0
    } else {
        timings[mid]
    }
}
