//! Tag affinity: the same frequency method as genre affinity, over tags.

use super::{label_affinity, scan_candidates};
use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScorerKind, ScorerRun};
use catalog::{Catalog, MAX_RATING};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Scores candidates by shared themes (tags) with the selection
#[derive(Debug, Clone, Copy, Default)]
pub struct TagAffinity;

impl Scorer for TagAffinity {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Tag
    }

    #[instrument(skip_all, fields(scorer = "tag"))]
    fn score(&self, catalog: &Catalog, profile: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
        debug!("Scoring {} tags from selection", profile.tag_frequency.len());

        scan_candidates(self.kind(), catalog, profile, cancel, |item| {
            let (overlap, matched) = label_affinity(&item.tags, &profile.tag_frequency);
            if matched.is_empty() {
                return None;
            }
            let score = f64::from(overlap) * item.rating / MAX_RATING;
            Some((score, format!("Similar themes: {}", matched.join(", "))))
        })
    }
}
