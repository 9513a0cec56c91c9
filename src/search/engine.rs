use crate::config::SearchConfig;
use crate::index::TokenizerAdapter;
use crate::storage::{Document, Storage};
use serde::Serialize;

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub score: u64,
}

/// Ranks stored documents against a free-text query
#[derive(Clone)]
pub struct SearchEngine {
    tokenizer: TokenizerAdapter,
    max_results: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(TokenizerAdapter::default(), SearchConfig::default().max_results)
    }
}

impl SearchEngine {
    pub fn new(tokenizer: TokenizerAdapter, max_results: usize) -> Self {
        Self {
            tokenizer,
            max_results,
        }
    }

    pub fn from_config(config: &SearchConfig, tokenizer: TokenizerAdapter) -> Self {
        Self::new(tokenizer, config.max_results)
    }

    /// Returns the top hits for `query`, best first
    ///
    /// An empty result means no stored document shares a token with the
    /// query. Only a failure to load the corpus is an error.
    pub async fn search<S: Storage>(
        &self,
        store: &S,
        query: &str,
    ) -> crate::Result<Vec<SearchHit>> {
        let tokens = tokenize_query(&self.tokenizer, query).await;
        if tokens.is_empty() {
            tracing::debug!("Query {:?} has no tokens", query);
            return Ok(Vec::new());
        }

        let documents = store.find_all()?;
        tracing::debug!(
            "Scoring {} documents against {:?}",
            documents.len(),
            tokens
        );

        let hits = documents
            .iter()
            .map(|doc| SearchHit {
                url: doc.url.clone(),
                score: score_document(&tokens, doc),
            })
            .collect();

        Ok(rank(hits, self.max_results))
    }
}

/// Splits a query on whitespace and normalizes it like page text
pub async fn tokenize_query(tokenizer: &TokenizerAdapter, query: &str) -> Vec<String> {
    let words: Vec<String> = query.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return Vec::new();
    }

    tokenizer
        .normalize(words)
        .await
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect()
}

/// Similarity of one document to the query tokens
///
/// A repeated query token counts once per occurrence in the query.
pub fn score_document(tokens: &[String], doc: &Document) -> u64 {
    let overlap: u64 = tokens
        .iter()
        .map(|token| u64::from(doc.index.get(token).copied().unwrap_or(0)))
        .sum();

    if overlap == 0 {
        return 0;
    }

    overlap + doc.references.len() as u64
}

/// Keeps the `limit` best nonzero hits, score descending then URL ascending
pub fn rank(mut hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.retain(|hit| hit.score > 0);
    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.url.cmp(&b.url)));
    hits.truncate(limit);
    hits
}
