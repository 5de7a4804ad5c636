//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper:
//! - Building the HTTP client with a proper user agent string
//! - GET requests for single account pages
//! - Concurrent fan-out over the full page range
//!
//! Only two statuses are expected. 200 carries a page, 404 means the
//! account number is unused. Anything else fails the whole batch, and
//! there is no retry.

use crate::config::{SourceConfig, UserAgentConfig};
use crate::KontoError;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Result of fetching one account page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page exists; holds the raw HTML
    Page(String),

    /// The server answered 404, so no account has this number
    Absent,
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is `name/version`, with `(+contact-url)` appended when a
/// contact URL is configured. Without `request-timeout-secs` the client keeps
/// reqwest's default (no timeout).
///
/// # Example
///
/// ```no_run
/// use konto_scrape::config::Config;
/// use konto_scrape::scrape::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.source, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    source: &SourceConfig,
    agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent_string(agent))
        .gzip(true)
        .brotli(true);

    if let Some(secs) = source.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Formats the user agent header value
pub fn user_agent_string(agent: &UserAgentConfig) -> String {
    match &agent.contact_url {
        Some(contact) => format!("{}/{} (+{})", agent.name, agent.version, contact),
        None => format!("{}/{}", agent.name, agent.version),
    }
}

/// Fetches a single page
///
/// # Returns
///
/// * `Ok(FetchOutcome::Page)` - HTTP 200 with the body text
/// * `Ok(FetchOutcome::Absent)` - HTTP 404
/// * `Err(KontoError::UnexpectedStatus)` - any other status
/// * `Err(KontoError::Http)` - connection or body read failure
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchOutcome, KontoError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| KontoError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        tracing::debug!("{} -> 404, no account", url);
        return Ok(FetchOutcome::Absent);
    }

    if status != StatusCode::OK {
        return Err(KontoError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| KontoError::Http {
        url: url.to_string(),
        source,
    })?;

    tracing::debug!("{} -> 200, {} bytes", url, body.len());
    Ok(FetchOutcome::Page(body))
}

/// Fetches every locator concurrently and returns the bodies of existing pages
///
/// All requests are spawned up front on a `JoinSet`. With `max_in_flight`
/// set, a semaphore caps how many are on the wire at once; with `None` the
/// fan-out is unbounded.
///
/// The result order is completion order, not input order, and absent pages
/// are dropped. The first fatal error is returned immediately; the remaining
/// requests are aborted and any pages already received are discarded.
pub async fn fetch_all(
    client: &Client,
    locators: Vec<Url>,
    max_in_flight: Option<usize>,
) -> Result<Vec<String>, KontoError> {
    let limiter = max_in_flight.map(|limit| Arc::new(Semaphore::new(limit)));
    let total = locators.len();

    let mut tasks = JoinSet::new();
    for url in locators {
        let client = client.clone();
        let limiter = limiter.clone();

        tasks.spawn(async move {
            // The permit is held until the request finishes
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            fetch_page(&client, &url).await
        });
    }

    tracing::info!(
        "Fetching {} pages ({})",
        total,
        match max_in_flight {
            Some(limit) => format!("at most {} in flight", limit),
            None => "unbounded".to_string(),
        }
    );

    let mut pages = Vec::with_capacity(total);
    let mut absent = 0usize;

    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(FetchOutcome::Page(body)) => pages.push(body),
            Ok(FetchOutcome::Absent) => absent += 1,
            Err(e) => {
                tracing::error!("Aborting batch: {}", e);
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    tracing::info!("Fetched {} pages, {} absent", pages.len(), absent);
    Ok(pages)
}
