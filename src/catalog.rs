//! Account records and the catalog that aggregates them
//!
//! The catalog is the persisted artifact: one JSON object whose keys are
//! account ids and whose values carry the Norwegian field names `tittel`
//! and `beskrivelse`.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A single account as extracted from one description page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account number, kept as an opaque string token
    pub id: String,

    /// Short human-readable label
    pub title: String,

    /// Flattened description text with links rendered inline
    pub description: String,
}

/// The value stored for each account id in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub tittel: String,
    pub beskrivelse: String,
}

impl From<Account> for AccountEntry {
    fn from(account: Account) -> Self {
        Self {
            tittel: account.title,
            beskrivelse: account.description,
        }
    }
}

/// Mapping from account id to title and description
///
/// Entries are kept sorted by id so that the written artifact is stable
/// between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, AccountEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from extracted accounts; a later duplicate id replaces an earlier one
    pub fn from_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = Account>,
    {
        let mut catalog = Self::new();
        for account in accounts {
            catalog.insert(account);
        }
        catalog
    }

    /// Inserts an account, returning the entry it replaced (if any)
    pub fn insert(&mut self, account: Account) -> Option<AccountEntry> {
        let id = account.id.clone();
        self.entries.insert(id, AccountEntry::from(account))
    }

    pub fn get(&self, id: &str) -> Option<&AccountEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in ascending id order
    pub fn iter(&self) -> btree_map::Iter<'_, String, AccountEntry> {
        self.entries.iter()
    }

    /// Serializes the catalog as JSON indented with four spaces
    ///
    /// Non-ASCII characters are written as UTF-8, never as `\u` escapes.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(serde::ser::Error::custom)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a String, &'a AccountEntry);
    type IntoIter = btree_map::Iter<'a, String, AccountEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Account> for Catalog {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self::from_accounts(iter)
    }
}

/// Returns the account class (first digit, 1-9) of a numeric account id
///
/// Non-numeric ids and ids starting with 0 have no class.
pub fn account_class(id: &str) -> Option<u8> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    id.chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|d| *d != 0)
        .map(|d| d as u8)
}
