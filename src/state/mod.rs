//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Tracks the phase of one page's crawl (queued, fetching, indexing, etc.)
//! - `VisitCache`: Run-scoped set of URLs already scheduled or crawled

mod page_state;
mod visit_cache;

// Re-export main types
pub use page_state::CrawlPhase;
pub use visit_cache::VisitCache;
