//! Account store - the catalog entry point
//!
//! The store composes the scrape pipeline with catalog storage:
//! - If a stored catalog exists it is returned as-is, with no network traffic
//! - Otherwise every page in the configured range is fetched, parsed, and the
//!   resulting catalog is written out before being returned
//!
//! Presence of the stored catalog is the only cache key. There is no TTL and
//! no checksum; deleting the file is what triggers the next scrape.

use crate::catalog::Catalog;
use crate::config::{validate, Config};
use crate::scrape::{build_http_client, build_locators, extract_all, fetch_all, ExtractRules};
use crate::storage::{open_storage, CatalogStorage, JsonFileStorage};
use crate::Result;
use std::time::Instant;

/// Lifecycle of an [`AccountStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No catalog has been requested yet, or the last scrape failed
    Uninitialized,

    /// A scrape is in progress
    Scraping,

    /// A complete catalog has been loaded or written
    Loaded,
}

impl StoreState {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// `Loaded` only leads back to `Scraping` through an explicit refresh or
    /// after the stored catalog was deleted.
    pub fn can_transition_to(&self, next: StoreState) -> bool {
        use StoreState::*;
        matches!(
            (self, next),
            (Uninitialized, Scraping)
                | (Uninitialized, Loaded)
                | (Scraping, Loaded)
                | (Scraping, Uninitialized)
                | (Loaded, Loaded)
                | (Loaded, Scraping)
        )
    }
}

/// Loads the account catalog, scraping it first when nothing is stored
pub struct AccountStore<S = JsonFileStorage> {
    config: Config,
    storage: S,
    state: StoreState,
}

impl AccountStore<JsonFileStorage> {
    /// Creates a store backed by the catalog file named in `config.output`
    pub fn new(config: Config) -> Self {
        let storage = open_storage(&config.output);
        Self::with_storage(config, storage)
    }
}

impl<S: CatalogStorage> AccountStore<S> {
    pub fn with_storage(config: Config, storage: S) -> Self {
        Self {
            config,
            storage,
            state: StoreState::Uninitialized,
        }
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the full catalog
    ///
    /// The stored catalog is read on every call, so an externally deleted
    /// file is noticed and regenerated.
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` - The stored or freshly scraped catalog
    /// * `Err(KontoError)` - Storage, fetch, or parse failure; nothing is written
    pub async fn get_accounts(&mut self) -> Result<Catalog> {
        if let Some(catalog) = self.storage.load()? {
            tracing::info!("Read {} accounts from stored catalog", catalog.len());
            self.transition(StoreState::Loaded);
            return Ok(catalog);
        }

        tracing::info!("No stored catalog found, scraping");
        self.scrape_and_save().await
    }

    /// Scrapes the catalog again and replaces the stored one
    ///
    /// The old catalog stays in place until the new one is complete.
    pub async fn refresh(&mut self) -> Result<Catalog> {
        tracing::info!("Refreshing catalog");
        self.scrape_and_save().await
    }

    async fn scrape_and_save(&mut self) -> Result<Catalog> {
        self.transition(StoreState::Scraping);

        match self.scrape_into_storage().await {
            Ok(catalog) => {
                self.transition(StoreState::Loaded);
                Ok(catalog)
            }
            Err(e) => {
                self.transition(StoreState::Uninitialized);
                Err(e)
            }
        }
    }

    async fn scrape_into_storage(&self) -> Result<Catalog> {
        let catalog = scrape_catalog(&self.config).await?;
        self.storage.save(&catalog)?;
        Ok(catalog)
    }

    fn transition(&mut self, next: StoreState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid store transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!("Store state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Runs one full scrape without touching storage
///
/// Fetches every page in the configured range, extracts an account from each
/// page that exists, and builds the catalog. HTML parsing runs on the
/// blocking pool.
pub async fn scrape_catalog(config: &Config) -> Result<Catalog> {
    validate(config)?;
    let started = Instant::now();

    let locators = build_locators(&config.source)?;
    let client = build_http_client(&config.source, &config.user_agent)?;
    let max_in_flight = config.source.max_concurrent_requests.map(|n| n as usize);

    let pages = fetch_all(&client, locators, max_in_flight).await?;

    let rules = ExtractRules::from_config(&config.extract)?;
    let policy = config.extract.on_parse_error;
    let accounts =
        tokio::task::spawn_blocking(move || extract_all(&pages, &rules, policy)).await??;

    let catalog = Catalog::from_accounts(accounts);
    tracing::info!(
        "Scraped {} accounts in {:.1}s",
        catalog.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(catalog)
}

/// Returns the account catalog for `config`
///
/// This is the one-call entry point: pass `Config::default()` to use the
/// lucaregnskap.no source and `lucaregnskap.json` in the working directory.
///
/// # Example
///
/// ```no_run
/// use konto_scrape::{get_accounts, Config};
///
/// # async fn run() -> konto_scrape::Result<()> {
/// let accounts = get_accounts(&Config::default()).await?;
/// if let Some(entry) = accounts.get("1920") {
///     println!("{}: {}", entry.tittel, entry.beskrivelse);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn get_accounts(config: &Config) -> Result<Catalog> {
    AccountStore::new(config.clone()).get_accounts().await
}
