//! HTML parser for extracting links and indexed text
//!
//! This module handles parsing HTML content to extract:
//! - Anchor targets, resolved and filtered into crawl candidates
//! - The text sources fed to the page indexer
//!
//! Parsed documents are never returned; every function hands back owned data.

use crate::url::resolve_candidate;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Text sources of a page that feed the token index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    /// The page title (from the first <title> tag)
    pub title: Option<String>,

    /// Non-empty `alt` attributes of every <img>
    pub alt_texts: Vec<String>,

    /// Content of `<meta name="description">`
    pub description: Option<String>,

    /// `"<tag> <text>"` for every h1, h2 and h3 element
    pub headings: Vec<String>,
}

/// Returns the raw `href` of every anchor, in document order
pub fn extract_anchor_targets(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Resolves and filters every anchor target into a deduplicated candidate list
///
/// # Example
///
/// ```
/// use spider_index::crawler::extract_candidates;
/// use url::Url;
///
/// let html = r##"<a href="/about">About</a><a href="bad.js">x</a><a href="#top">Top</a>"##;
/// let base = Url::parse("https://example.com").unwrap();
/// let candidates = extract_candidates(html, &base);
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].as_str(), "https://example.com/about");
/// ```
pub fn extract_candidates(html: &str, base_url: &Url) -> Vec<Url> {
    let mut unique = HashSet::new();
    extract_anchor_targets(html)
        .iter()
        .filter_map(|raw| resolve_candidate(raw, base_url))
        .filter(|url| unique.insert(url.as_str().to_string()))
        .collect()
}

/// Extracts the indexed text sources of a page
pub fn extract_page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    PageText {
        title: extract_title(&document),
        alt_texts: extract_alt_texts(&document),
        description: extract_description(&document),
        headings: extract_headings(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_alt_texts(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[alt]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("alt"))
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .map(str::to_string)
        .collect()
}

fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name=description]").ok()?;

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty())
}

fn extract_headings(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("h1, h2, h3") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| {
            let text = element.text().collect::<Vec<_>>().join(" ");
            format!("{} {}", element.value().name(), text.trim())
        })
        .collect()
}
