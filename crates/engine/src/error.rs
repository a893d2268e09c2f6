//! Error types for the engine crate.
//!
//! Cancellation never shows up here: a losing scorer is expected control
//! flow. Everything else that goes wrong during `recommend` or `benchmark`
//! is reported synchronously through `EngineError`.

use catalog::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The mean-based scorers are undefined over an empty selection
    #[error("Selection is empty: pick at least one item")]
    EmptySelection,

    /// Catalog collaborator failure, passed through unchanged
    #[error(transparent)]
    Catalog(CatalogError),

    /// A scorer task failed for a reason other than cancellation
    #[error("Scorer task {scorer} failed: {reason}")]
    TaskFailed { scorer: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl EngineError {
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, EngineError::EmptySelection)
    }
}

/// Empty selections get their own variant; every other catalog error is
/// wrapped as-is.
impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::EmptySelection => EngineError::EmptySelection,
            other => EngineError::Catalog(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
