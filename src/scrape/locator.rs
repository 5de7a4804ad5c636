//! Page addresses for the configured account range

use crate::config::SourceConfig;
use url::Url;

/// Builds the address of every account page in the configured inclusive range
///
/// Each address is the base URL with the decimal account number appended.
pub fn build_locators(source: &SourceConfig) -> Result<Vec<Url>, url::ParseError> {
    (source.first_id..=source.last_id)
        .map(|id| locator_for(&source.base_url, id))
        .collect()
}

/// Builds the page address for a single account number
pub fn locator_for(base_url: &str, id: u32) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}{}", base_url, id))
}
