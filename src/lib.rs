//! Konto-Scrape: a catalog of Norwegian bookkeeping accounts
//!
//! This crate fetches the account description pages for a configured range of
//! account numbers, extracts an id, title and description from each page, and
//! persists the result as a single JSON catalog keyed by account id. Once the
//! catalog file exists it is used as-is and no network traffic happens.

pub mod catalog;
pub mod config;
pub mod report;
pub mod scrape;
pub mod storage;
pub mod store;

use thiserror::Error;

/// Main error type for Konto-Scrape operations
#[derive(Debug, Error)]
pub enum KontoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("HTML parse error: {message}")]
    Parse { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl KontoError {
    /// Returns true for failures caused by a page's markup rather than the batch
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Konto-Scrape operations
pub type Result<T> = std::result::Result<T, KontoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Account, AccountEntry, Catalog};
pub use config::Config;
pub use store::{get_accounts, AccountStore, StoreState};
