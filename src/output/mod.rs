//! Output module for user-facing terminal output
//!
//! This module handles:
//! - Rendering ranked search results
//! - The existing-entry prompt shown before re-crawling a seed
//! - Store statistics

mod prompt;
mod results;
pub mod stats;

pub use prompt::{confirm_update, is_affirmative, write_existing_entry, write_update_prompt};
pub use results::{
    print_search_results, write_crawl_report, write_search_results, NO_RESULTS_BANNER,
    RESULTS_BANNER,
};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
