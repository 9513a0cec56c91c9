//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of page bodies
//! - HTML parsing, link extraction and text extraction
//! - Live-link probing
//! - Concurrent per-page orchestration

mod engine;
mod fetcher;
mod parser;
mod validator;

pub use engine::{CrawlEngine, CrawlOptions, CrawlReport};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use parser::{extract_anchor_targets, extract_candidates, extract_page_text, PageText};
pub use validator::{HttpLinkValidator, LinkStatus, LinkValidator};

use crate::storage::{Document, Storage, StorageResult};
use url::Url;

/// Looks up the stored document for a crawl seed
///
/// Used before a crawl to decide whether the seed needs the update prompt.
pub fn existing_entry<S: Storage>(store: &S, seed: &Url) -> StorageResult<Option<Document>> {
    store.find(seed.as_str())
}
