//! JSON file backend for the account catalog

use crate::catalog::Catalog;
use crate::storage::traits::{CatalogStorage, StorageError, StorageResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores the catalog as one pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Directory the temp file is created in; must share a filesystem with the target
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl CatalogStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Option<Catalog>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let catalog = Catalog::from_json(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            "Loaded {} accounts from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(Some(catalog))
    }

    fn save(&self, catalog: &Catalog) -> StorageResult<()> {
        let json = catalog.to_pretty_json()?;

        let mut tmp = NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.io_error(e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(
            "Wrote {} accounts to {}",
            catalog.len(),
            self.path.display()
        );
        Ok(())
    }

    fn remove(&self) -> StorageResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
