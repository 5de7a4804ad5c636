//! Konto-Scrape main entry point
//!
//! This is the command-line interface for building and querying the
//! account catalog.

use clap::Parser;
use konto_scrape::config::{load_config, Config};
use konto_scrape::report::{print_statistics, CatalogStatistics};
use konto_scrape::scrape::{build_locators, user_agent_string};
use konto_scrape::storage::CatalogStorage;
use konto_scrape::store::AccountStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Konto-Scrape: a catalog of Norwegian bookkeeping accounts
///
/// Loads the account catalog from disk, scraping the account description
/// pages first if no catalog has been written yet.
#[derive(Parser, Debug)]
#[command(name = "konto-scrape")]
#[command(version)]
#[command(about = "Builds a catalog of bookkeeping account descriptions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape again even if a catalog already exists
    #[arg(long, conflicts_with_all = ["dry_run", "clear"])]
    force: bool,

    /// Delete the stored catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "lookup"])]
    clear: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with_all = ["stats", "lookup"])]
    dry_run: bool,

    /// Show statistics for the catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "lookup"])]
    stats: bool,

    /// Print a single account by id
    #[arg(long, value_name = "ID", conflicts_with_all = ["dry_run", "stats"])]
    lookup: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let mut store = AccountStore::new(config);

    if cli.clear {
        let path = store.storage().path().display().to_string();
        if store.storage().remove()? {
            println!("✓ Removed {}", path);
        } else {
            println!("No catalog at {}", path);
        }
        return Ok(());
    }

    let result = if cli.force {
        store.refresh().await
    } else {
        store.get_accounts().await
    };

    let catalog = match result {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Failed to load accounts: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        print_statistics(&CatalogStatistics::from_catalog(&catalog));
    } else if let Some(id) = &cli.lookup {
        match catalog.get(id) {
            Some(entry) => {
                println!("{} {}", id, entry.tittel);
                println!();
                println!("{}", entry.beskrivelse);
            }
            None => {
                return Err(format!("No account with id {}", id).into());
            }
        }
    } else {
        println!(
            "✓ {} accounts in {}",
            catalog.len(),
            store.storage().path().display()
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("konto_scrape=info,warn"),
            1 => EnvFilter::new("konto_scrape=debug,info"),
            2 => EnvFilter::new("konto_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let locators = build_locators(&config.source)?;

    println!("=== Konto-Scrape Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!(
        "  Account range: {}..={} ({} pages)",
        config.source.first_id,
        config.source.last_id,
        locators.len()
    );
    match config.source.max_concurrent_requests {
        Some(limit) => println!("  Max concurrent requests: {}", limit),
        None => println!("  Max concurrent requests: unbounded"),
    }
    match config.source.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: client default"),
    }
    println!("  User agent: {}", user_agent_string(&config.user_agent));

    println!("\nExtraction:");
    println!("  Id prefix: {:?}", config.extract.id_prefix);
    println!("  Headings: {}", config.extract.heading_selector);
    println!("  Description: {}", config.extract.description_selector);
    println!("  On parse error: {:?}", config.extract.on_parse_error);

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.catalog_path);

    if let (Some(first), Some(last)) = (locators.first(), locators.last()) {
        println!("\n✓ Would fetch {} .. {}", first, last);
    }

    Ok(())
}
