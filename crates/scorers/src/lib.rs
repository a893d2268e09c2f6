//! # Scorers Crate
//!
//! This crate implements the five independent scoring heuristics the engine
//! races against each other.
//!
//! ## Components
//!
//! - **Genre affinity**: frequency of the selection's genres, weighted by rating
//! - **Rating affinity**: candidates rated close to the selection's mean
//! - **Tag affinity**: frequency of the selection's tags, weighted by rating
//! - **Recency affinity**: candidates from the selection's era (±10 years)
//! - **Duration affinity**: candidates of similar length (±30 minutes)
//!
//! All five are pure: they read a shared `Catalog` and `SelectionProfile`,
//! return their own contribution list, and check a cancellation token once
//! per catalog item. Any interleaving is safe.
//!
//! ## Example Usage
//!
//! ```ignore
//! use scorers::{build_selection_profile, default_scorers};
//! use tokio_util::sync::CancellationToken;
//!
//! let profile = build_selection_profile(&catalog, &selection)?;
//! let cancel = CancellationToken::new();
//!
//! for scorer in default_scorers() {
//!     let run = scorer.score(&catalog, &profile, &cancel);
//! }
//! ```

pub mod types;
pub mod traits;
pub mod profile;
pub mod algorithms;

// Re-export commonly used types
pub use algorithms::{
    default_scorers, DurationAffinity, GenreAffinity, RatingAffinity, RecencyAffinity, TagAffinity,
};
pub use profile::{build_selection_profile, SelectionProfile};
pub use traits::Scorer;
pub use types::{ScoreContribution, ScorerKind, ScorerRun};
