//! Storage module for persisting the account catalog
//!
//! The catalog is written once per scrape and afterwards read wholesale.
//! There is no partial update: a stored catalog is either complete or absent.

mod json_file;
mod traits;

pub use json_file::JsonFileStorage;
pub use traits::{CatalogStorage, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the catalog storage described by the output configuration
pub fn open_storage(config: &OutputConfig) -> JsonFileStorage {
    JsonFileStorage::new(&config.catalog_path)
}
