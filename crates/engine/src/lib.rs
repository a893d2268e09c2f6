//! # Engine Crate
//!
//! Combines the scorers into ranked recommendations and measures how that
//! scales with concurrency.
//!
//! ## Components
//!
//! ### Speculative scheduler
//! Races all five scorers under a thread budget:
//! - First scorer to finish becomes the primary result, the rest are cancelled
//! - A primary that fills half of the requested results is accepted as-is
//! - Otherwise stragglers are gathered for up to `straggler_timeout_ms`
//!
//! ### Sequential baseline
//! The same five scorers one after another with no cancellation. Used as
//! the benchmark reference and whenever the budget is 1.
//!
//! ### Aggregator
//! Sums contributions per item, builds the rationale, drops selected items,
//! sorts by score (ties by id) and truncates.
//!
//! ### Benchmark harness
//! Times the baseline once and the scheduler at each candidate budget, then
//! reports speedup and efficiency.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{EngineConfig, RecommendationEngine};
//! use catalog::Catalog;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load_from_file("data/catalog.dat".as_ref())?);
//! let selection = catalog.resolve_selection(&[1, 4])?;
//!
//! let engine = RecommendationEngine::new(EngineConfig::default())?;
//! let results = engine.recommend(catalog.clone(), &selection, 10, None).await?;
//! let report = engine.benchmark(catalog, &selection).await?;
//! println!("{}", report);
//! ```

// Public modules
pub mod aggregator;
pub mod benchmark;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod sequential;

// Re-export commonly used types
pub use aggregator::{Aggregator, RankedResult};
pub use benchmark::{BenchmarkHarness, BenchmarkReport, BenchmarkSample};
pub use config::EngineConfig;
pub use engine::RecommendationEngine;
pub use error::{EngineError, Result};
pub use events::{ProgressSink, ProgressStreams, Stage, StatusEvent};
pub use scheduler::{RunMetrics, ScheduleOutcome, SchedulerState, SpeculativeScheduler};
