use crate::crawler::{extract_page_text, PageText};
use crate::index::tokenizer::{strip_punctuation, TokenizerAdapter};
use std::collections::BTreeMap;

/// Builds the token index of a fetched page
#[derive(Clone, Default)]
pub struct PageIndexer {
    tokenizer: TokenizerAdapter,
}

impl PageIndexer {
    pub fn new(tokenizer: TokenizerAdapter) -> Self {
        Self { tokenizer }
    }

    /// Flattens the indexed text sources into lowercased, punctuation-free words
    ///
    /// Sources are taken in a fixed order: title, image alt texts, meta
    /// description, headings. The order has no effect on the final counts.
    pub fn collect_words(text: &PageText) -> Vec<String> {
        let sources = text
            .title
            .iter()
            .chain(text.alt_texts.iter())
            .chain(text.description.iter())
            .chain(text.headings.iter());

        sources
            .flat_map(|source| source.split_whitespace())
            .map(|word| strip_punctuation(&word.to_lowercase()))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Indexes already extracted page text
    pub async fn index_text(&self, text: &PageText) -> BTreeMap<String, u32> {
        let words = Self::collect_words(text);
        let tokens = self.tokenizer.normalize(words).await;
        count_tokens(&tokens)
    }

    /// Extracts the indexed text sources from raw markup and indexes them
    pub async fn index_html(&self, html: &str) -> BTreeMap<String, u32> {
        let text = extract_page_text(html);
        self.index_text(&text).await
    }
}

/// Counts normalized tokens
///
/// Tokens are lowercased and stripped of punctuation once more, so partially
/// cleaned backend output still yields valid keys. Empty tokens are skipped.
pub fn count_tokens(tokens: &[String]) -> BTreeMap<String, u32> {
    let mut index = BTreeMap::new();
    for token in tokens {
        let token = strip_punctuation(&token.to_lowercase());
        if token.is_empty() {
            continue;
        }
        *index.entry(token).or_insert(0) += 1;
    }
    index
}
