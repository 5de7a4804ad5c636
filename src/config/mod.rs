//! Configuration module for Konto-Scrape
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so `Config::default()` is a complete configuration
//! for scraping lucaregnskap.no.
//!
//! # Example
//!
//! ```no_run
//! use konto_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("konto.toml")).unwrap();
//! println!("Fetching ids {}..={}", config.source.first_id, config.source.last_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractConfig, OutputConfig, ParseErrorPolicy, SourceConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
