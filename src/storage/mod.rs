//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Document insert and refresh
//! - Outbound (`seen`) and inbound (`references`) link lookups
//! - Full-corpus loading for search

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opens the store named by a connection URI
///
/// Accepted forms are a plain filesystem path, `sqlite://<path>` and
/// `:memory:` (or `sqlite::memory:`).
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully opened storage
/// * `Err(SpiderError)` - The store is unreachable
pub fn open_storage(uri: &str) -> crate::Result<SqliteStorage> {
    let uri = uri.trim();
    match uri {
        ":memory:" | "sqlite::memory:" => SqliteStorage::open_in_memory(),
        _ => {
            let path = uri.strip_prefix("sqlite://").unwrap_or(uri);
            SqliteStorage::new(std::path::Path::new(path))
        }
    }
}

/// The persisted record for one crawled URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Natural key of the document
    pub url: String,

    /// Validated, deduplicated outbound links in discovery order
    pub seen: Vec<String>,

    /// Crawl or refresh date
    pub time: NaiveDate,

    /// Normalized token -> occurrence count
    pub index: BTreeMap<String, u32>,

    /// URLs of stored documents whose `seen` contains this URL
    pub references: Vec<String>,
}

impl Document {
    /// Creates an empty document for a freshly fetched URL
    pub fn new(url: impl Into<String>, time: NaiveDate) -> Self {
        Self {
            url: url.into(),
            seen: Vec::new(),
            time,
            index: BTreeMap::new(),
            references: Vec::new(),
        }
    }
}

/// Fields refreshed when an existing document is re-crawled
#[derive(Debug, Clone)]
pub struct DocumentUpdate<'a> {
    pub seen: &'a [String],
    pub time: NaiveDate,
}
