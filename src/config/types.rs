use serde::Deserialize;

/// Main configuration structure for Konto-Scrape
///
/// Every section is optional; a missing section falls back to the values
/// for lucaregnskap.no.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where account pages live and how they are fetched
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Address prefix; the account number is appended to it
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// First account number to fetch (inclusive)
    #[serde(rename = "first-id", default = "default_first_id")]
    pub first_id: u32,

    /// Last account number to fetch (inclusive)
    #[serde(rename = "last-id", default = "default_last_id")]
    pub last_id: u32,

    /// Maximum number of requests in flight; unbounded when absent
    #[serde(rename = "max-concurrent-requests", default)]
    pub max_concurrent_requests: Option<u32>,

    /// Per-request timeout in seconds; the client default when absent
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            first_id: default_first_id(),
            last_id: default_last_id(),
            max_concurrent_requests: None,
            request_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    #[serde(default = "default_agent_version")]
    pub version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

/// Markup rules for pulling an account out of a page
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Literal stripped from the first heading to leave the account id
    #[serde(rename = "id-prefix", default = "default_id_prefix")]
    pub id_prefix: String,

    /// Selector for the id and title headings, in that order
    #[serde(rename = "heading-selector", default = "default_heading_selector")]
    pub heading_selector: String,

    /// Selector for the block holding the description body
    #[serde(
        rename = "description-selector",
        default = "default_description_selector"
    )]
    pub description_selector: String,

    /// What to do with a page that lacks the expected markup
    #[serde(rename = "on-parse-error", default)]
    pub on_parse_error: ParseErrorPolicy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            heading_selector: default_heading_selector(),
            description_selector: default_description_selector(),
            on_parse_error: ParseErrorPolicy::default(),
        }
    }
}

/// Handling of pages whose markup cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorPolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log a warning and leave the page out of the catalog
    Skip,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON catalog file
    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.lucaregnskap.no/kontobeskrivelser/".to_string()
}

fn default_first_id() -> u32 {
    1000
}

fn default_last_id() -> u32 {
    8990
}

fn default_agent_name() -> String {
    "konto-scrape".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_id_prefix() -> String {
    "Konto: ".to_string()
}

fn default_heading_selector() -> String {
    "h1".to_string()
}

fn default_description_selector() -> String {
    "div.account-description".to_string()
}

fn default_catalog_path() -> String {
    "lucaregnskap.json".to_string()
}
