//! Scoring heuristic implementations.
//!
//! Each heuristic walks the catalog once, skipping selected items, and turns
//! every match into a `ScoreContribution`. The walk itself lives in
//! `scan_candidates` so that the cancellation check happens at exactly one
//! place: the per-item loop boundary.

pub mod duration;
pub mod genre;
pub mod rating;
pub mod recency;
pub mod tag;

// Re-export for convenience
pub use duration::DurationAffinity;
pub use genre::GenreAffinity;
pub use rating::RatingAffinity;
pub use recency::RecencyAffinity;
pub use tag::TagAffinity;

use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScoreContribution, ScorerKind, ScorerRun};
use catalog::{Catalog, CatalogItem};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The five heuristics with their default parameters, in launch order
pub fn default_scorers() -> Vec<Arc<dyn Scorer>> {
    vec![
        Arc::new(GenreAffinity),
        Arc::new(RatingAffinity::new()),
        Arc::new(TagAffinity),
        Arc::new(RecencyAffinity::new()),
        Arc::new(DurationAffinity::new()),
    ]
}

/// Walk every unselected item, checking `cancel` before each one.
///
/// `score_item` returns `Some((score, rationale))` for items the heuristic
/// wants to recommend.
pub(crate) fn scan_candidates<F>(
    kind: ScorerKind,
    catalog: &Catalog,
    profile: &SelectionProfile,
    cancel: &CancellationToken,
    mut score_item: F,
) -> ScorerRun
where
    F: FnMut(&CatalogItem) -> Option<(f64, String)>,
{
    let mut contributions = Vec::new();

    for item in catalog.items() {
        if cancel.is_cancelled() {
            return ScorerRun::Cancelled;
        }
        if profile.is_selected(item.id) {
            continue;
        }
        if let Some((score, rationale)) = score_item(item) {
            contributions.push(ScoreContribution::new(item.id, score, rationale, kind));
        }
    }

    ScorerRun::Completed(contributions)
}

/// Sum of selection frequencies over an item's labels, plus the labels that
/// matched (in label order)
pub(crate) fn label_affinity<'a>(
    labels: &'a BTreeSet<String>,
    frequency: &HashMap<String, u32>,
) -> (u32, Vec<&'a str>) {
    let mut total = 0;
    let mut matched = Vec::new();
    for label in labels {
        if let Some(&count) = frequency.get(label) {
            total += count;
            matched.push(label.as_str());
        }
    }
    (total, matched)
}

/// Linear falloff inside a symmetric window: 1.0 at the centre, 0.0 at the
/// edge, `None` outside
pub(crate) fn window_closeness(value: f64, centre: f64, half_width: f64) -> Option<f64> {
    let diff = (value - centre).abs();
    if diff <= half_width {
        Some((half_width - diff) / half_width)
    } else {
        None
    }
}
