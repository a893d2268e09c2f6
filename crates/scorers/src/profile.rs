//! Build a SelectionProfile from the catalog and the user's selection.
//!
//! Every scorer needs some aggregate of the selection (label frequencies or
//! a mean). Computing them once up front keeps the scorers' per-item loops
//! cheap and lets all five share one read-only profile.

use catalog::{Catalog, CatalogError, ItemId, Result, SelectionSet};
use std::collections::HashMap;

/// Aggregates of the user's selection, computed once per engine run
#[derive(Debug, Clone)]
pub struct SelectionProfile {
    pub selection: SelectionSet,

    /// How many selected items carry each genre label
    pub genre_frequency: HashMap<String, u32>,

    /// How many selected items carry each tag label
    pub tag_frequency: HashMap<String, u32>,

    pub mean_rating: f64,
    pub mean_year: f64,
    pub mean_duration: f64,
}

impl SelectionProfile {
    /// Whether an item was selected (and so must never be recommended)
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(id)
    }
}

/// Build a SelectionProfile for the given selection
///
/// The mean-based scorers are undefined over an empty set, so an empty
/// selection is rejected here rather than producing NaN means.
pub fn build_selection_profile(catalog: &Catalog, selection: &SelectionSet) -> Result<SelectionProfile> {
    if selection.is_empty() {
        return Err(CatalogError::EmptySelection);
    }

    let mut genre_frequency: HashMap<String, u32> = HashMap::new();
    let mut tag_frequency: HashMap<String, u32> = HashMap::new();
    let (mut rating_sum, mut year_sum, mut duration_sum) = (0.0, 0.0, 0.0);

    for id in selection.ids() {
        let item = catalog.get_item(id).ok_or(CatalogError::UnknownItem(id))?;

        for genre in &item.genres {
            *genre_frequency.entry(genre.clone()).or_insert(0) += 1;
        }
        for tag in &item.tags {
            *tag_frequency.entry(tag.clone()).or_insert(0) += 1;
        }

        rating_sum += item.rating;
        year_sum += f64::from(item.year);
        duration_sum += f64::from(item.duration_minutes);
    }

    let count = selection.len() as f64;
    Ok(SelectionProfile {
        selection: selection.clone(),
        genre_frequency,
        tag_frequency,
        mean_rating: rating_sum / count,
        mean_year: year_sum / count,
        mean_duration: duration_sum / count,
    })
}
