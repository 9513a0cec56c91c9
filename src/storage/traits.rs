//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{Document, DocumentUpdate};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document already exists: {0}")]
    DuplicateDocument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This is the persistence gateway consumed by the crawl engine and the search
/// engine. Callers share one instance behind a lock, so implementations need
/// not be internally synchronized.
pub trait Storage {
    /// Returns true if a document with this URL is stored
    fn exists(&self, url: &str) -> StorageResult<bool>;

    /// Gets a document by URL
    fn find(&self, url: &str) -> StorageResult<Option<Document>>;

    /// Inserts a new document
    ///
    /// Fails with `DuplicateDocument` if the URL is already stored.
    fn insert(&mut self, doc: &Document) -> StorageResult<()>;

    /// Replaces `seen` and `time` of an existing document
    ///
    /// `index` and `references` are left untouched.
    fn update(&mut self, url: &str, update: DocumentUpdate<'_>) -> StorageResult<()>;

    /// Loads every stored document
    fn find_all(&self) -> StorageResult<Vec<Document>>;

    /// Gets the URLs of documents whose `seen` list contains `url`
    fn find_referencing(&self, url: &str) -> StorageResult<Vec<String>>;

    /// Counts stored documents
    fn count_documents(&self) -> StorageResult<u64>;

    /// Counts stored `seen` edges across all documents
    fn count_links(&self) -> StorageResult<u64>;
}
