//! Catalog supplier boundary.
//!
//! The engine never owns the catalog's storage. It asks a `CatalogSupplier`
//! for a read-only snapshot on every call and hands any failure back to its
//! caller as-is.

use crate::error::Result;
use crate::types::Catalog;
use std::path::PathBuf;

/// Anything that can hand out a full catalog snapshot.
///
/// `Send + Sync` so a supplier can be shared with the engine across tasks.
pub trait CatalogSupplier: Send + Sync {
    /// Return every catalog item as a fresh snapshot
    fn load(&self) -> Result<Catalog>;
}

/// Reads the catalog from a `.dat` file on every call
#[derive(Debug, Clone)]
pub struct FileCatalogSupplier {
    path: PathBuf,
}

impl FileCatalogSupplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CatalogSupplier for FileCatalogSupplier {
    fn load(&self) -> Result<Catalog> {
        Catalog::load_from_file(&self.path)
    }
}

/// An in-memory catalog supplies clones of itself
impl CatalogSupplier for Catalog {
    fn load(&self) -> Result<Catalog> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::types::CatalogItem;

    #[test]
    fn test_in_memory_supplier_returns_snapshot() {
        let catalog: Catalog = [CatalogItem::new(1, "Heat", 8.2, 1995, 170)].into_iter().collect();

        let snapshot = catalog.load().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get_item(1).unwrap().title, "Heat");
    }

    #[test]
    fn test_file_supplier_surfaces_missing_file() {
        let supplier = FileCatalogSupplier::new("no/such/catalog.dat");

        assert!(matches!(
            supplier.load(),
            Err(CatalogError::FileNotFound { .. })
        ));
    }
}
