//! Storage traits and error types
//!
//! This module defines the trait interface for catalog storage backends and
//! associated error types.

use crate::catalog::Catalog;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Catalog {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog storage backends
///
/// Presence of a stored catalog is the only freshness signal: whatever
/// `load` returns is used as-is.
pub trait CatalogStorage {
    /// Loads the stored catalog
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Catalog))` - A catalog is stored
    /// * `Ok(None)` - Nothing has been stored yet
    /// * `Err(StorageError)` - The catalog exists but could not be read
    fn load(&self) -> StorageResult<Option<Catalog>>;

    /// Replaces the stored catalog in a single step
    ///
    /// Readers never observe a partially written catalog.
    fn save(&self, catalog: &Catalog) -> StorageResult<()>;

    /// Deletes the stored catalog, returning whether one existed
    fn remove(&self) -> StorageResult<bool>;
}
