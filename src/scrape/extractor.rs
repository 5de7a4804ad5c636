//! Account extraction from description pages
//!
//! A page carries two headings (the first holds the prefixed account id,
//! the second the title) and one description block. Links inside the
//! description are rendered inline as `text (title)` before the block is
//! flattened to plain text.

use crate::catalog::Account;
use crate::config::{ExtractConfig, ParseErrorPolicy};
use crate::{ConfigError, KontoError};
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors and literals used to pull an account out of a page
#[derive(Debug, Clone)]
pub struct ExtractRules {
    id_prefix: String,
    headings: Selector,
    description: Selector,
}

impl ExtractRules {
    /// Compiles the rules from configuration
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            id_prefix: config.id_prefix.clone(),
            headings: compile(&config.heading_selector)?,
            description: compile(&config.description_selector)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector(selector.to_string()))
}

fn parse_error(message: impl Into<String>) -> KontoError {
    KontoError::Parse {
        message: message.into(),
    }
}

/// Extracts one account from a page's HTML
///
/// # Returns
///
/// * `Ok(Account)` - id, title and flattened description
/// * `Err(KontoError::Parse)` - a heading or the description block is missing,
///   or the id heading is empty once the prefix is removed
///
/// # Example
///
/// ```
/// use konto_scrape::config::ExtractConfig;
/// use konto_scrape::scrape::{extract_account, ExtractRules};
///
/// let rules = ExtractRules::from_config(&ExtractConfig::default()).unwrap();
/// let html = r#"<h1>Konto: 1920</h1><h1>Bankinnskudd</h1>
///     <div class="account-description">Se <a title="Kontanter">1900</a>.</div>"#;
/// let account = extract_account(html, &rules).unwrap();
/// assert_eq!(account.id, "1920");
/// assert_eq!(account.description, "Se 1900 (Kontanter).");
/// ```
pub fn extract_account(html: &str, rules: &ExtractRules) -> Result<Account, KontoError> {
    let document = Html::parse_document(html);

    let mut headings = document.select(&rules.headings);
    let id_heading = headings
        .next()
        .ok_or_else(|| parse_error("missing account id heading"))?;
    let title_heading = headings
        .next()
        .ok_or_else(|| parse_error("missing account title heading"))?;

    let id = extract_id(&id_heading.text().collect::<String>(), &rules.id_prefix);
    if id.is_empty() {
        return Err(parse_error("account id heading is empty"));
    }

    let title: String = title_heading.text().collect();

    let block = document
        .select(&rules.description)
        .next()
        .ok_or_else(|| parse_error(format!("missing description block for account {}", id)))?;

    let mut description = String::new();
    flatten_into(block, &mut description);

    Ok(Account {
        id,
        title,
        description: description.trim().to_string(),
    })
}

/// Strips the literal prefix from the id heading text
fn extract_id(heading: &str, prefix: &str) -> String {
    let heading = heading.trim();
    heading
        .strip_prefix(prefix.trim())
        .unwrap_or(heading)
        .trim()
        .to_string()
}

/// Appends the text of `element`, rendering each link as `text (title)`
fn flatten_into(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if child_element.value().name() == "a" {
                let link_text: String = child_element.text().collect();
                push_link(out, &link_text, child_element.value().attr("title"));
            } else {
                flatten_into(child_element, out);
            }
        }
    }
}

fn push_link(out: &mut String, text: &str, title: Option<&str>) {
    out.push_str(text);
    match title {
        Some(title) if !title.is_empty() => {
            out.push_str(" (");
            out.push_str(title);
            out.push(')');
        }
        _ => {}
    }
}

/// Extracts accounts from every page
///
/// With [`ParseErrorPolicy::Abort`] the first malformed page fails the whole
/// batch. With [`ParseErrorPolicy::Skip`] malformed pages are logged and left out.
pub fn extract_all(
    pages: &[String],
    rules: &ExtractRules,
    policy: ParseErrorPolicy,
) -> Result<Vec<Account>, KontoError> {
    let mut accounts = Vec::with_capacity(pages.len());
    let mut skipped = 0usize;

    for html in pages {
        match extract_account(html, rules) {
            Ok(account) => accounts.push(account),
            Err(e) if policy == ParseErrorPolicy::Skip && e.is_parse_error() => {
                tracing::warn!("Skipping page: {}", e);
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed pages", skipped);
    }
    tracing::info!("Extracted {} accounts", accounts.len());

    Ok(accounts)
}
