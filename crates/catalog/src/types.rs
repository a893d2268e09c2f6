//! Core domain types for the recommendation catalog.
//!
//! This module defines the records the engine reads:
//! - `CatalogItem`: one immutable title in the catalog
//! - `SelectionSet`: the ids the user picked
//! - `Catalog`: the in-memory index over all items

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique, stable identifier for a catalog item
pub type ItemId = u32;

/// Highest rating a catalog item can carry
pub const MAX_RATING: f64 = 10.0;

// =============================================================================
// Catalog Item
// =============================================================================

/// One title in the catalog.
///
/// Genres and tags are sets: order is irrelevant and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    /// Rating from 0.0 to 10.0
    pub rating: f64,
    /// Release year
    pub year: u16,
    /// Running time in minutes
    pub duration_minutes: u32,
    pub genres: BTreeSet<String>,
    pub tags: BTreeSet<String>,
}

impl CatalogItem {
    /// Create an item with no genres or tags; add them with the `with_*` helpers
    pub fn new(id: ItemId, title: impl Into<String>, rating: f64, year: u16, duration_minutes: u32) -> Self {
        Self {
            id,
            title: title.into(),
            rating,
            year,
            duration_minutes,
            genres: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Add genre labels (builder pattern)
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(genres.into_iter().map(Into::into));
        self
    }

    /// Add tag labels (builder pattern)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Genres joined for display, e.g. "Crime, Drama"
    pub fn genre_list(&self) -> String {
        self.genres.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl std::fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}) - Rating: {:.1}/10 - Genre: {}",
            self.id,
            self.title,
            self.year,
            self.rating,
            self.genre_list()
        )
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The ids the user chose. Never contains duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: BTreeSet<ItemId>,
}

impl SelectionSet {
    /// Build a selection from raw ids; duplicates collapse.
    ///
    /// No catalog lookup happens here, see `Catalog::resolve_selection` for
    /// the validated path.
    pub fn new(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<ItemId> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

// =============================================================================
// Catalog - The In-Memory Index
// =============================================================================

/// Read-only snapshot of every catalog item.
///
/// Items are kept in a `BTreeMap` so iteration is always id-ascending; the
/// scorers rely on that for deterministic output.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) items: BTreeMap<ItemId, CatalogItem>,
}

impl Catalog {
    /// Creates a new, empty Catalog
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Get an item by id
    pub fn get_item(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items.get(&id)
    }

    /// All items, id-ascending
    pub fn items(&self) -> impl ExactSizeIterator<Item = &CatalogItem> + '_ {
        self.items.values()
    }

    /// All item ids, id-ascending
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert an item, replacing any previous item with the same id.
    ///
    /// Returns the replaced item, if any.
    pub fn insert_item(&mut self, item: CatalogItem) -> Option<CatalogItem> {
        self.items.insert(item.id, item)
    }
}

impl FromIterator<CatalogItem> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogItem>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert_item(item);
        }
        catalog
    }
}
