//! Recency affinity: candidates from the same era as the selection.
//!
//! ## Algorithm
//! 1. Mean release year of the selection
//! 2. Keep candidates within ±window years (default 10)
//! 3. Score = (window - |diff|) / window × rating / 10

use super::{scan_candidates, window_closeness};
use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScorerKind, ScorerRun};
use catalog::{Catalog, MAX_RATING};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Scores candidates released near the selection's mean year
#[derive(Debug, Clone, Copy)]
pub struct RecencyAffinity {
    window_years: f64,
}

impl RecencyAffinity {
    pub fn new() -> Self {
        Self { window_years: 10.0 }
    }

    /// Configure the half-width of the year window (default: 10)
    pub fn with_window_years(mut self, years: f64) -> Self {
        self.window_years = years;
        self
    }
}

impl Default for RecencyAffinity {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for RecencyAffinity {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Recency
    }

    #[instrument(skip_all, fields(scorer = "recency"))]
    fn score(&self, catalog: &Catalog, profile: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
        let mean = profile.mean_year;
        debug!("Mean selection year {:.0}, window ±{}", mean, self.window_years);

        scan_candidates(self.kind(), catalog, profile, cancel, |item| {
            let closeness = window_closeness(f64::from(item.year), mean, self.window_years)?;
            Some((
                closeness * item.rating / MAX_RATING,
                format!("Released {}, near your {:.0} average", item.year, mean),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::*;
    use catalog::CatalogItem;

    #[test]
    fn test_recency_affinity() {
        let catalog = create_test_catalog();
        // Shawshank, 1994
        let profile = profile_for(&catalog, &[1]);

        let contributions = completed(RecencyAffinity::new().score(&catalog, &profile, &CancellationToken::new()));
        let ids: Vec<u32> = contributions.iter().map(|c| c.item_id).collect();

        // Godfather (1972) and Parasite (2019) fall outside ±10 years
        assert_eq!(ids, vec![3, 4, 5]);

        let toy_story = contributions.iter().find(|c| c.item_id == 5).unwrap();
        assert!((toy_story.score - 0.9 * 0.83).abs() < 1e-9);
    }

    #[test]
    fn test_twenty_five_year_gap_scores_nothing() {
        let catalog: Catalog = [
            CatalogItem::new(1, "Early", 8.0, 1990, 120),
            CatalogItem::new(2, "Late", 8.0, 2000, 120),
            CatalogItem::new(3, "Far Future", 8.0, 2020, 120),
            CatalogItem::new(4, "Same Era", 8.0, 1996, 120),
        ]
        .into_iter()
        .collect();
        let profile = profile_for(&catalog, &[1, 2]);
        assert!((profile.mean_year - 1995.0).abs() < 1e-9);

        let contributions = completed(RecencyAffinity::new().score(&catalog, &profile, &CancellationToken::new()));

        assert!(contributions.iter().all(|c| c.item_id != 3));
        assert!(contributions.iter().any(|c| c.item_id == 4));
    }
}
