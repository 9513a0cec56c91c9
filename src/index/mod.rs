//! Indexing module for turning page text into token counts
//!
//! This module contains:
//! - The tokenizer capability and its external-process and in-process backends
//! - The adapter that falls back to the in-process normalizer on any failure
//! - The page indexer that builds a token -> count map from page text

mod indexer;
mod tokenizer;

pub use indexer::{count_tokens, PageIndexer};
pub use tokenizer::{
    local_normalize, parse_tokenizer_output, strip_punctuation, ExternalTokenizer,
    LocalTokenizer, Tokenizer, TokenizerAdapter, TokenizerError,
};
