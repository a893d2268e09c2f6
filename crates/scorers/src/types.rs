//! Types shared by every scorer.

use catalog::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the five scoring heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScorerKind {
    Genre,
    Rating,
    Tag,
    Recency,
    Duration,
}

impl ScorerKind {
    /// Every scorer, in launch order
    pub const ALL: [ScorerKind; 5] = [
        ScorerKind::Genre,
        ScorerKind::Rating,
        ScorerKind::Tag,
        ScorerKind::Recency,
        ScorerKind::Duration,
    ];

    /// Human-readable scorer name, used in rationales and logs
    pub fn name(self) -> &'static str {
        match self {
            ScorerKind::Genre => "Genre",
            ScorerKind::Rating => "Rating",
            ScorerKind::Tag => "Tags",
            ScorerKind::Recency => "Year",
            ScorerKind::Duration => "Duration",
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One scorer's verdict on one candidate item.
///
/// Produced by exactly one scorer invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub item_id: ItemId,
    /// Always >= 0
    pub score: f64,
    pub rationale: String,
    pub scorer: ScorerKind,
}

impl ScoreContribution {
    pub fn new(item_id: ItemId, score: f64, rationale: impl Into<String>, scorer: ScorerKind) -> Self {
        Self {
            item_id,
            score,
            rationale: rationale.into(),
            scorer,
        }
    }
}

/// How a scorer invocation ended.
///
/// Cancellation is ordinary control flow, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorerRun {
    Completed(Vec<ScoreContribution>),
    Cancelled,
}

impl ScorerRun {
    /// Contributions of a completed run; `None` when cancelled
    pub fn into_contributions(self) -> Option<Vec<ScoreContribution>> {
        match self {
            ScorerRun::Completed(contributions) => Some(contributions),
            ScorerRun::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScorerRun::Cancelled)
    }
}
