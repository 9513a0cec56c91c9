//! Search module for ranking stored pages against a query
//!
//! Scoring is computed client-side over the full corpus:
//! - Token overlap: the sum of each query token's count in the page index
//! - Reference bonus: the inbound reference count, added only when overlap is nonzero
//!
//! Hits are ordered by descending score, then ascending URL.

mod engine;

pub use engine::{rank, score_document, tokenize_query, SearchEngine, SearchHit};
