//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Document, DocumentUpdate};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SpiderError)` - Failed to open database
    pub fn new(path: &Path) -> crate::Result<Self> {
        let conn = Connection::open(path).map_err(StorageError::from)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(StorageError::from)?;

        initialize_schema(&conn).map_err(StorageError::from)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StorageError::from)?;
        initialize_schema(&conn).map_err(StorageError::from)?;
        Ok(Self { conn })
    }

    fn load_seen(&self, url: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT to_url FROM links WHERE from_url = ?1 ORDER BY position ASC")?;

        let seen = stmt
            .query_map(params![url], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(seen)
    }

    fn write_seen(tx: &Transaction<'_>, url: &str, seen: &[String]) -> StorageResult<()> {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO links (from_url, to_url, position) VALUES (?1, ?2, ?3)",
        )?;
        for (position, target) in seen.iter().enumerate() {
            stmt.execute(params![url, target, position as i64])?;
        }
        Ok(())
    }
}

/// Raw column values of a `documents` row
struct DocumentRow {
    url: String,
    crawled_on: String,
    token_index: String,
    refs: String,
}

impl DocumentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            crawled_on: row.get(1)?,
            token_index: row.get(2)?,
            refs: row.get(3)?,
        })
    }

    /// Decodes the row; malformed columns degrade to empty values
    fn into_document(self, seen: Vec<String>) -> Document {
        let time = NaiveDate::parse_from_str(&self.crawled_on, DATE_FORMAT).unwrap_or_else(|e| {
            tracing::warn!("Unreadable crawl date for {}: {}", self.url, e);
            NaiveDate::default()
        });

        let index = serde_json::from_str::<BTreeMap<String, u32>>(&self.token_index)
            .unwrap_or_else(|e| {
                tracing::warn!("Unreadable token index for {}: {}", self.url, e);
                BTreeMap::new()
            });

        let references = serde_json::from_str::<Vec<String>>(&self.refs).unwrap_or_else(|e| {
            tracing::warn!("Unreadable references for {}: {}", self.url, e);
            Vec::new()
        });

        Document {
            url: self.url,
            seen,
            time,
            index,
            references,
        }
    }
}

impl Storage for SqliteStorage {
    fn exists(&self, url: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn find(&self, url: &str) -> StorageResult<Option<Document>> {
        let row = self
            .conn
            .query_row(
                "SELECT url, crawled_on, token_index, refs FROM documents WHERE url = ?1",
                params![url],
                DocumentRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => {
                let seen = self.load_seen(url)?;
                Ok(Some(row.into_document(seen)))
            }
            None => Ok(None),
        }
    }

    fn insert(&mut self, doc: &Document) -> StorageResult<()> {
        if self.exists(&doc.url)? {
            return Err(StorageError::DuplicateDocument(doc.url.clone()));
        }

        let token_index = serde_json::to_string(&doc.index)?;
        let refs = serde_json::to_string(&doc.references)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO documents (url, crawled_on, token_index, refs) VALUES (?1, ?2, ?3, ?4)",
            params![
                doc.url,
                doc.time.format(DATE_FORMAT).to_string(),
                token_index,
                refs
            ],
        )?;
        Self::write_seen(&tx, &doc.url, &doc.seen)?;
        tx.commit()?;

        Ok(())
    }

    fn update(&mut self, url: &str, update: DocumentUpdate<'_>) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE documents SET crawled_on = ?1 WHERE url = ?2",
            params![update.time.format(DATE_FORMAT).to_string(), url],
        )?;
        if changed == 0 {
            return Err(StorageError::DocumentNotFound(url.to_string()));
        }

        tx.execute("DELETE FROM links WHERE from_url = ?1", params![url])?;
        Self::write_seen(&tx, url, update.seen)?;
        tx.commit()?;

        Ok(())
    }

    fn find_all(&self) -> StorageResult<Vec<Document>> {
        let mut seen_by_url: HashMap<String, Vec<String>> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT from_url, to_url FROM links ORDER BY from_url, position")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (from_url, to_url) = row?;
                seen_by_url.entry(from_url).or_default().push(to_url);
            }
        }

        let mut stmt = self
            .conn
            .prepare("SELECT url, crawled_on, token_index, refs FROM documents ORDER BY url")?;
        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let documents = rows
            .into_iter()
            .map(|row| {
                let seen = seen_by_url.remove(&row.url).unwrap_or_default();
                row.into_document(seen)
            })
            .collect();

        Ok(documents)
    }

    fn find_referencing(&self, url: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT from_url FROM links WHERE to_url = ?1 ORDER BY from_url")?;

        let referrers = stmt
            .query_map(params![url], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(referrers)
    }

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
