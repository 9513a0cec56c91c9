//! URL handling module for spider-index
//!
//! This module resolves raw anchor targets against the page they were found
//! on and rejects targets that can never be crawlable pages.

mod filter;
mod resolve;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use filter::{has_excluded_suffix, is_fragment_only, EXCLUDED_SUFFIXES};
pub use resolve::resolve_candidate;

/// Parses a seed URL given by the operator
///
/// Only HTTP and HTTPS are accepted. The fragment is dropped so the seed uses
/// the same key form as every discovered link.
///
/// # Examples
///
/// ```
/// use spider_index::url::parse_seed;
///
/// let seed = parse_seed("https://example.com#top").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/");
/// ```
pub fn parse_seed(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    url.set_fragment(None);
    Ok(url)
}
