//! Rating affinity: candidates rated close to what the user usually picks.
//!
//! ## Algorithm
//! 1. Mean rating of the selection
//! 2. Keep candidates with |rating - mean| <= tolerance (default 1.0)
//! 3. Score = (tolerance - |diff|) × rating

use super::scan_candidates;
use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScorerKind, ScorerRun};
use catalog::Catalog;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Scores candidates whose rating sits near the selection's mean rating
#[derive(Debug, Clone, Copy)]
pub struct RatingAffinity {
    tolerance: f64,
}

impl RatingAffinity {
    pub fn new() -> Self {
        Self { tolerance: 1.0 }
    }

    /// Configure the accepted rating distance (default: 1.0)
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Default for RatingAffinity {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for RatingAffinity {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Rating
    }

    #[instrument(skip_all, fields(scorer = "rating"))]
    fn score(&self, catalog: &Catalog, profile: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
        let mean = profile.mean_rating;
        debug!("Mean selection rating {:.2}, tolerance {}", mean, self.tolerance);

        scan_candidates(self.kind(), catalog, profile, cancel, |item| {
            let diff = (item.rating - mean).abs();
            if diff > self.tolerance {
                return None;
            }
            let score = (self.tolerance - diff) * item.rating;
            Some((
                score,
                format!(
                    "Rating {:.1}/10 close to your average {:.1}/10",
                    item.rating, mean
                ),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::*;

    #[test]
    fn test_rating_affinity() {
        let catalog = create_test_catalog();
        // Mean rating 9.3
        let profile = profile_for(&catalog, &[1]);

        let contributions = completed(RatingAffinity::new().score(&catalog, &profile, &CancellationToken::new()));
        let ids: Vec<u32> = contributions.iter().map(|c| c.item_id).collect();

        // 9.2, 8.6, 8.7, 8.6 within 1.0; Toy Story (8.3) is exactly 1.0 away
        assert_eq!(ids, vec![2, 3, 4, 5, 6]);

        let godfather = &contributions[0];
        assert!((godfather.score - 0.9 * 9.2).abs() < 1e-9);

        let toy_story = contributions.iter().find(|c| c.item_id == 5).unwrap();
        assert!(toy_story.score.abs() < 1e-9);
        assert!(contributions.iter().all(|c| c.score >= -1e-12));
    }

    #[test]
    fn test_rating_affinity_tight_tolerance() {
        let catalog = create_test_catalog();
        let profile = profile_for(&catalog, &[1]);

        let scorer = RatingAffinity::new().with_tolerance(0.2);
        let contributions = completed(scorer.score(&catalog, &profile, &CancellationToken::new()));

        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].item_id, 2);
    }
}
