//! # Catalog Crate
//!
//! This crate holds the catalog the recommendation engine reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (CatalogItem, SelectionSet, Catalog)
//! - **parser**: Parse `.dat` catalog files into Rust structs
//! - **index**: Loading, validation, selection resolution and browsing queries
//! - **supplier**: The `CatalogSupplier` boundary the engine consumes
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/catalog.dat"))?;
//! let selection = catalog.resolve_selection(&[1, 4, 7])?;
//!
//! for item in catalog.selected_items(&selection) {
//!     println!("{}", item);
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod supplier;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use supplier::{CatalogSupplier, FileCatalogSupplier};
pub use types::{
    // Type aliases
    ItemId,
    MAX_RATING,
    // Core types
    Catalog,
    CatalogItem,
    SelectionSet,
};
