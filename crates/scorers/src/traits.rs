//! Core trait for the scoring heuristics.
//!
//! Every heuristic implements `Scorer` so the scheduler can launch them
//! uniformly, race them and cancel the losers.

use crate::profile::SelectionProfile;
use crate::types::{ScorerKind, ScorerRun};
use catalog::Catalog;
use tokio_util::sync::CancellationToken;

/// A pure function from (catalog, selection) to per-item contributions.
///
/// ## Design Note
/// - `Send + Sync` so one instance can be shared by concurrent tasks
/// - Scorers read the catalog and profile only; they hold no mutable state
/// - `score` checks `cancel` once per catalog item and returns
///   `ScorerRun::Cancelled` as soon as it is set
pub trait Scorer: Send + Sync {
    /// Which heuristic this is
    fn kind(&self) -> ScorerKind;

    /// Returns the name of this scorer (for logging/rationales)
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Score every catalog item that is not in the selection.
    ///
    /// # Arguments
    /// * `catalog` - Read-only catalog snapshot
    /// * `profile` - Aggregates of the user's selection
    /// * `cancel` - Cooperative cancellation signal
    fn score(
        &self,
        catalog: &Catalog,
        profile: &SelectionProfile,
        cancel: &CancellationToken,
    ) -> ScorerRun;
}
