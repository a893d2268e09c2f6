//! Genre affinity: "you picked a lot of Drama, here is more Drama".
//!
//! ## Algorithm
//! 1. Count how many selected items carry each genre label
//! 2. For each candidate, sum the counts of its genre labels
//! 3. Score = sum × rating / 10, skipping candidates whose sum is 0

use super::{label_affinity, scan_candidates};
use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScorerKind, ScorerRun};
use catalog::{Catalog, MAX_RATING};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Scores candidates by genre overlap with the selection
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreAffinity;

impl Scorer for GenreAffinity {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Genre
    }

    #[instrument(skip_all, fields(scorer = "genre"))]
    fn score(&self, catalog: &Catalog, profile: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
        debug!("Scoring {} genres from selection", profile.genre_frequency.len());

        scan_candidates(self.kind(), catalog, profile, cancel, |item| {
            let (overlap, matched) = label_affinity(&item.genres, &profile.genre_frequency);
            if overlap == 0 {
                return None;
            }
            let score = f64::from(overlap) * item.rating / MAX_RATING;
            Some((score, format!("Matches genres: {}", matched.join(", "))))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::fixtures::*;

    #[test]
    fn test_genre_affinity() {
        let catalog = create_test_catalog();
        // Shawshank (Drama) + Godfather (Crime, Drama)
        let profile = profile_for(&catalog, &[1, 2]);

        let contributions = completed(GenreAffinity.score(&catalog, &profile, &CancellationToken::new()));

        // Green Mile: Crime(1) + Drama(2) = 3, × 8.6 / 10
        let green_mile = contributions.iter().find(|c| c.item_id == 3).unwrap();
        assert!((green_mile.score - 3.0 * 0.86).abs() < 1e-9);
        assert_eq!(green_mile.rationale, "Matches genres: Crime, Drama");
        assert_eq!(green_mile.scorer, ScorerKind::Genre);

        // Parasite: Drama(2)
        let parasite = contributions.iter().find(|c| c.item_id == 6).unwrap();
        assert!((parasite.score - 2.0 * 0.86).abs() < 1e-9);

        // Matrix and Toy Story share nothing: skipped
        assert!(contributions.iter().all(|c| c.item_id != 4 && c.item_id != 5));
    }
}
