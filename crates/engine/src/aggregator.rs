//! Merge scorer contributions into ranked results.
//!
//! ## Algorithm
//! 1. Group contributions by item id (first appearance order)
//! 2. Per group: score = sum of member scores, rationale = the two
//!    highest-scoring members, scorers = distinct names in arrival order
//! 3. Drop anything in the selection
//! 4. Sort by score descending, ties by item id ascending
//! 5. Truncate to `max_results`
//!
//! Score sums and scorer sets do not depend on contribution order, so the
//! merge is safe to feed from concurrently finishing scorers.

use catalog::{Catalog, CatalogItem, ItemId, SelectionSet};
use scorers::{ScoreContribution, ScorerKind};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// How many contributions feed a result's rationale
const RATIONALE_PARTS: usize = 2;

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub item: CatalogItem,
    pub score: f64,
    pub rationale: String,
    pub scorers: Vec<ScorerKind>,
}

impl RankedResult {
    pub fn item_id(&self) -> ItemId {
        self.item.id
    }

    /// Scorer names joined for display, e.g. "Genre, Rating"
    pub fn scorer_list(&self) -> String {
        self.scorers
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Combines contributions for one catalog/selection pair
pub struct Aggregator<'a> {
    catalog: &'a Catalog,
    selection: &'a SelectionSet,
}

impl<'a> Aggregator<'a> {
    pub fn new(catalog: &'a Catalog, selection: &'a SelectionSet) -> Self {
        Self { catalog, selection }
    }

    /// Group, sum, filter, rank and truncate
    pub fn aggregate(&self, contributions: &[ScoreContribution], max_results: usize) -> Vec<RankedResult> {
        let mut slots: HashMap<ItemId, usize> = HashMap::new();
        let mut groups: Vec<Vec<&ScoreContribution>> = Vec::new();

        for contribution in contributions {
            let slot = *slots.entry(contribution.item_id).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(contribution);
        }

        let mut results: Vec<RankedResult> = groups
            .into_iter()
            .filter(|group| !self.selection.contains(group[0].item_id))
            .filter_map(|group| self.combine(&group))
            .collect();

        sort_ranked(&mut results);
        results.truncate(max_results);

        debug!(
            "Aggregated {} contributions into {} results",
            contributions.len(),
            results.len()
        );
        results
    }

    fn combine(&self, group: &[&ScoreContribution]) -> Option<RankedResult> {
        let item_id = group[0].item_id;
        let Some(item) = self.catalog.get_item(item_id) else {
            warn!("Dropping contributions for unknown item {}", item_id);
            return None;
        };

        let score: f64 = group.iter().map(|c| c.score).sum();

        let mut by_score: Vec<&ScoreContribution> = group.to_vec();
        by_score.sort_by(|a, b| b.score.total_cmp(&a.score));
        let rationale = by_score
            .iter()
            .take(RATIONALE_PARTS)
            .map(|c| format!("{}: {}", c.scorer, c.rationale))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut seen = HashSet::new();
        let scorers = group
            .iter()
            .map(|c| c.scorer)
            .filter(|kind| seen.insert(*kind))
            .collect();

        Some(RankedResult {
            item: item.clone(),
            score,
            rationale,
            scorers,
        })
    }
}

/// Last step of every run: keep the first occurrence of each item, re-sort,
/// truncate
pub fn finalize(results: Vec<RankedResult>, max_results: usize) -> Vec<RankedResult> {
    let mut seen = HashSet::new();
    let mut results: Vec<RankedResult> = results
        .into_iter()
        .filter(|r| seen.insert(r.item_id()))
        .collect();
    sort_ranked(&mut results);
    results.truncate(max_results);
    results
}

/// Score descending, then item id ascending
fn sort_ranked(results: &mut [RankedResult]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id().cmp(&b.item_id()))
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Compare two result lists ignoring order among equal scores
    pub(crate) fn same_ranking(a: &[RankedResult], b: &[RankedResult], epsilon: f64) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let key = |r: &RankedResult| (r.item_id(), r.score);
        let mut a: Vec<(ItemId, f64)> = a.iter().map(key).collect();
        let mut b: Vec<(ItemId, f64)> = b.iter().map(key).collect();
        a.sort_by(|x, y| x.0.cmp(&y.0));
        b.sort_by(|x, y| x.0.cmp(&y.0));
        a.iter()
            .zip(&b)
            .all(|(x, y)| x.0 == y.0 && (x.1 - y.1).abs() <= epsilon)
    }

    fn create_test_catalog() -> Catalog {
        (1..=6)
            .map(|id| CatalogItem::new(id, format!("Item {}", id), 8.0, 2000, 120))
            .collect()
    }

    fn contribution(id: ItemId, score: f64, scorer: ScorerKind) -> ScoreContribution {
        ScoreContribution::new(id, score, format!("{} reason", scorer.name().to_lowercase()), scorer)
    }

    #[test]
    fn test_groups_and_sums() {
        let catalog = create_test_catalog();
        let selection = SelectionSet::new([1]);
        let aggregator = Aggregator::new(&catalog, &selection);

        let contributions = vec![
            contribution(2, 1.0, ScorerKind::Genre),
            contribution(3, 4.0, ScorerKind::Rating),
            contribution(2, 2.5, ScorerKind::Tag),
            contribution(2, 0.5, ScorerKind::Genre),
        ];

        let results = aggregator.aggregate(&contributions, 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].item_id(), 2);
        assert!((results[0].score - 4.0).abs() < 1e-9);
        assert_eq!(results[0].scorers, vec![ScorerKind::Genre, ScorerKind::Tag]);
        assert_eq!(results[0].rationale, "Tags: tags reason | Genre: genre reason");
        assert_eq!(results[1].item_id(), 3);
    }

    #[test]
    fn test_excludes_selection() {
        let catalog = create_test_catalog();
        let selection = SelectionSet::new([2, 3]);
        let aggregator = Aggregator::new(&catalog, &selection);

        let contributions = vec![
            contribution(2, 9.0, ScorerKind::Genre),
            contribution(3, 9.0, ScorerKind::Genre),
            contribution(4, 1.0, ScorerKind::Genre),
        ];

        let results = aggregator.aggregate(&contributions, 10);
        assert_eq!(results.iter().map(|r| r.item_id()).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_truncates_and_breaks_ties_by_id() {
        let catalog = create_test_catalog();
        let selection = SelectionSet::new([1]);
        let aggregator = Aggregator::new(&catalog, &selection);

        let contributions = vec![
            contribution(5, 1.0, ScorerKind::Rating),
            contribution(3, 1.0, ScorerKind::Rating),
            contribution(4, 1.0, ScorerKind::Rating),
            contribution(6, 2.0, ScorerKind::Rating),
        ];

        let results = aggregator.aggregate(&contributions, 3);
        assert_eq!(results.iter().map(|r| r.item_id()).collect::<Vec<_>>(), vec![6, 3, 4]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let catalog = create_test_catalog();
        let selection = SelectionSet::new([1]);
        let aggregator = Aggregator::new(&catalog, &selection);

        let contributions = vec![
            contribution(2, 1.0, ScorerKind::Genre),
            contribution(3, 0.7, ScorerKind::Recency),
            contribution(2, 2.0, ScorerKind::Duration),
            contribution(4, 3.0, ScorerKind::Tag),
            contribution(3, 0.4, ScorerKind::Genre),
            contribution(2, 0.1, ScorerKind::Rating),
        ];
        let forward = aggregator.aggregate(&contributions, 10);

        let mut reversed = contributions.clone();
        reversed.reverse();
        let backward = aggregator.aggregate(&reversed, 10);

        let mut rotated = contributions.clone();
        rotated.rotate_left(2);
        let shifted = aggregator.aggregate(&rotated, 10);

        for other in [&backward, &shifted] {
            assert!(same_ranking(&forward, other, 1e-9));
            for result in &forward {
                let twin = other.iter().find(|r| r.item_id() == result.item_id()).unwrap();
                let mut a = result.scorers.clone();
                let mut b = twin.scorers.clone();
                a.sort();
                b.sort();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_unknown_items_dropped() {
        let catalog = create_test_catalog();
        let selection = SelectionSet::new([1]);
        let aggregator = Aggregator::new(&catalog, &selection);

        let results = aggregator.aggregate(&[contribution(99, 5.0, ScorerKind::Genre)], 10);
        assert!(results.is_empty());
    }

    #[test]
    fn test_finalize_keeps_first_occurrence() {
        let catalog = create_test_catalog();
        let item = |id| catalog.get_item(id).unwrap().clone();
        let result = |id, score| RankedResult {
            item: item(id),
            score,
            rationale: String::new(),
            scorers: vec![ScorerKind::Genre],
        };

        let finalized = finalize(vec![result(2, 1.0), result(3, 5.0), result(2, 9.0), result(4, 2.0)], 2);

        assert_eq!(finalized.len(), 2);
        assert_eq!(finalized[0].item_id(), 3);
        assert_eq!(finalized[1].item_id(), 4);
    }
}
