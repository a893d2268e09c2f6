//! Catalog loading, validation and query logic.
//!
//! This module builds the `Catalog` from a parsed file and answers the
//! lookups the engine and the CLI need:
//! - Resolve a user's raw id list into a validated `SelectionSet`
//! - Title search and top-rated listing for browsing
//! - Integrity checks after loading

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info};

impl Catalog {
    /// Load a catalog from a `.dat` file.
    ///
    /// Steps:
    /// 1. Parse every line (in parallel)
    /// 2. Reject duplicate ids
    /// 3. Insert items
    /// 4. Validate data integrity
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", path);

        let items = parser::parse_catalog(path)?;

        let mut catalog = Catalog::new();
        for item in items {
            let id = item.id;
            if catalog.insert_item(item).is_some() {
                return Err(CatalogError::DuplicateItem(id));
            }
        }

        catalog.validate()?;

        info!("Loaded {} catalog items", catalog.len());
        Ok(catalog)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every rating is a finite number in 0.0 - 10.0
    /// - Every title is non-empty
    pub fn validate(&self) -> Result<()> {
        for item in self.items.values() {
            if !item.rating.is_finite() || item.rating < 0.0 || item.rating > MAX_RATING {
                return Err(CatalogError::InvalidValue {
                    field: "rating".to_string(),
                    value: item.rating.to_string(),
                });
            }
            if item.title.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "item {} has an empty title",
                    item.id
                )));
            }
        }
        Ok(())
    }

    /// Turn the user's raw id list into a `SelectionSet`.
    ///
    /// Duplicate ids collapse. Unknown ids and an empty list are rejected.
    pub fn resolve_selection(&self, ids: &[ItemId]) -> Result<SelectionSet> {
        if ids.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        if let Some(&unknown) = ids.iter().find(|id| !self.items.contains_key(id)) {
            return Err(CatalogError::UnknownItem(unknown));
        }
        let selection = SelectionSet::new(ids.iter().copied());
        debug!("Resolved selection of {} items", selection.len());
        Ok(selection)
    }

    /// The catalog records behind a selection, id-ascending.
    ///
    /// Ids missing from the catalog are skipped.
    pub fn selected_items(&self, selection: &SelectionSet) -> Vec<&CatalogItem> {
        selection.ids().filter_map(|id| self.get_item(id)).collect()
    }

    /// Case-insensitive title search: exact matches first, then substring
    /// matches, each group by rating descending.
    pub fn search_title(&self, query: &str) -> Vec<&CatalogItem> {
        let query = query.to_lowercase();
        let mut matches: Vec<(u8, &CatalogItem)> = self
            .items
            .values()
            .filter_map(|item| {
                let title = item.title.to_lowercase();
                if title == query {
                    Some((0, item))
                } else if title.contains(&query) {
                    Some((1, item))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.rating.total_cmp(&a.1.rating))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        matches.into_iter().map(|(_, item)| item).collect()
    }

    /// Highest rated items, ties broken by id
    pub fn top_rated(&self, limit: usize) -> Vec<&CatalogItem> {
        let mut items: Vec<&CatalogItem> = self.items.values().collect();
        items.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.id.cmp(&b.id)));
        items.truncate(limit);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog() -> Catalog {
        [
            CatalogItem::new(1, "The Shawshank Redemption", 9.3, 1994, 142).with_genres(["Drama"]),
            CatalogItem::new(2, "The Godfather", 9.2, 1972, 175).with_genres(["Crime", "Drama"]),
            CatalogItem::new(3, "Godfather Part II", 9.0, 1974, 202).with_genres(["Crime", "Drama"]),
            CatalogItem::new(4, "Inception", 8.7, 2010, 148).with_genres(["Action", "Sci-Fi"]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_selection() {
        let catalog = create_test_catalog();

        let selection = catalog.resolve_selection(&[2, 1, 2]).unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_resolve_selection_rejects_empty_and_unknown() {
        let catalog = create_test_catalog();

        assert!(matches!(
            catalog.resolve_selection(&[]),
            Err(CatalogError::EmptySelection)
        ));
        assert!(matches!(
            catalog.resolve_selection(&[1, 99]),
            Err(CatalogError::UnknownItem(99))
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_rating() {
        let mut catalog = create_test_catalog();
        catalog.insert_item(CatalogItem::new(5, "Broken", 11.0, 2000, 90));

        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_search_title_exact_first() {
        let catalog = create_test_catalog();

        let results = catalog.search_title("the godfather");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 2);

        let results = catalog.search_title("godfather");
        assert_eq!(results.len(), 2);
        // Both are substring matches, higher rating first
        assert_eq!(results[0].id, 2);
        assert_eq!(results[1].id, 3);
    }

    #[test]
    fn test_top_rated() {
        let catalog = create_test_catalog();

        let top = catalog.top_rated(2);
        assert_eq!(top.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut catalog = create_test_catalog();

        let old = catalog.insert_item(CatalogItem::new(2, "The Godfather", 9.2, 1972, 175).with_genres(["Drama"]));
        assert!(old.is_some_and(|item| item.genres.contains("Crime")));
        assert!(!catalog.get_item(2).unwrap().genres.contains("Crime"));
        assert_eq!(catalog.len(), 4);
    }
}
