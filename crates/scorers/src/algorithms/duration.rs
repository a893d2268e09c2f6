//! Duration affinity: candidates with a running time like the selection's.
//!
//! ## Algorithm
//! 1. Mean duration of the selection
//! 2. Keep candidates within ±tolerance minutes (default 30)
//! 3. Score = (tolerance - |diff|) / tolerance × rating / 10

use super::{scan_candidates, window_closeness};
use crate::profile::SelectionProfile;
use crate::traits::Scorer;
use crate::types::{ScorerKind, ScorerRun};
use catalog::{Catalog, MAX_RATING};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Scores candidates whose running time is near the selection's mean
#[derive(Debug, Clone, Copy)]
pub struct DurationAffinity {
    tolerance_minutes: f64,
}

impl DurationAffinity {
    pub fn new() -> Self {
        Self { tolerance_minutes: 30.0 }
    }

    /// Configure the accepted duration distance in minutes (default: 30)
    pub fn with_tolerance_minutes(mut self, minutes: f64) -> Self {
        self.tolerance_minutes = minutes;
        self
    }
}

impl Default for DurationAffinity {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for DurationAffinity {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Duration
    }

    #[instrument(skip_all, fields(scorer = "duration"))]
    fn score(&self, catalog: &Catalog, profile: &SelectionProfile, cancel: &CancellationToken) -> ScorerRun {
        let mean = profile.mean_duration;
        debug!("Mean selection duration {:.0}min, tolerance ±{}", mean, self.tolerance_minutes);

        scan_candidates(self.kind(), catalog, profile, cancel, |item| {
            let closeness =
                window_closeness(f64::from(item.duration_minutes), mean, self.tolerance_minutes)?;
            Some((
                closeness * item.rating / MAX_RATING,
                format!(
                    "Runs {}min, near your {:.0}min average",
                    item.duration_minutes, mean
                ),
            ))
        })
    }
}
