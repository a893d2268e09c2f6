//! Error types for the catalog crate.
//!
//! Every failure the catalog collaborator can report lives here, so callers
//! (the engine, the CLI) can match on a single enum and surface it unchanged.

use crate::types::ItemId;
use thiserror::Error;

/// Errors that can occur while loading, validating or querying a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be found
    #[error("Failed to open catalog file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading the catalog
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in the catalog file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had a value outside its domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two catalog records share the same id
    #[error("Duplicate catalog item id {0}")]
    DuplicateItem(ItemId),

    /// A selected id does not exist in the catalog
    #[error("Unknown catalog item id {0}")]
    UnknownItem(ItemId),

    /// The user selected nothing
    #[error("Selection is empty")]
    EmptySelection,

    /// Catalog validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
