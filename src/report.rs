//! Catalog statistics
//!
//! Summarizes a loaded catalog for the `--stats` command.

use crate::catalog::{account_class, Catalog};
use std::collections::BTreeMap;

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Total number of accounts
    pub total_accounts: usize,

    /// Number of accounts per account class (first digit of the id)
    pub accounts_by_class: BTreeMap<u8, usize>,

    /// Accounts whose id is not a plain number
    pub unclassified: usize,

    /// Ids of accounts with an empty description
    pub empty_descriptions: Vec<String>,
}

impl CatalogStatistics {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut accounts_by_class = BTreeMap::new();
        let mut unclassified = 0;
        let mut empty_descriptions = Vec::new();

        for (id, entry) in catalog {
            match account_class(id) {
                Some(class) => *accounts_by_class.entry(class).or_insert(0) += 1,
                None => unclassified += 1,
            }

            if entry.beskrivelse.trim().is_empty() {
                empty_descriptions.push(id.clone());
            }
        }

        Self {
            total_accounts: catalog.len(),
            accounts_by_class,
            unclassified,
            empty_descriptions,
        }
    }
}

/// Name of a Norwegian standard chart of accounts class
pub fn class_name(class: u8) -> &'static str {
    match class {
        1 => "Eiendeler",
        2 => "Egenkapital og gjeld",
        3 => "Salgs- og driftsinntekter",
        4 => "Varekostnad",
        5 => "Lønnskostnad",
        6 | 7 => "Annen driftskostnad",
        8 => "Finansinntekt og -kostnad, skatt",
        _ => "Ukjent",
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Account Catalog Statistics ===\n");
    println!("Total accounts: {}", stats.total_accounts);

    println!("\nAccounts by class:");
    for (class, count) in &stats.accounts_by_class {
        println!("  {} {:<36} {:>5}", class, class_name(*class), count);
    }
    if stats.unclassified > 0 {
        println!("  - {:<36} {:>5}", "Non-numeric ids", stats.unclassified);
    }

    if !stats.empty_descriptions.is_empty() {
        println!(
            "\nAccounts without description ({}):",
            stats.empty_descriptions.len()
        );
        for id in &stats.empty_descriptions {
            println!("  - {}", id);
        }
    }
}
