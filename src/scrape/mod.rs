//! Scrape module for fetching and parsing account pages
//!
//! This module contains the stages of a scrape:
//! - Building page addresses for the configured account range
//! - Fetching all pages concurrently
//! - Extracting one account record per page

mod extractor;
mod fetcher;
mod locator;

pub use extractor::{extract_account, extract_all, ExtractRules};
pub use fetcher::{build_http_client, fetch_all, fetch_page, user_agent_string, FetchOutcome};
pub use locator::{build_locators, locator_for};
