//! Statistics generation from the document store

use crate::storage::{Storage, StorageResult};

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of stored documents
    pub total_documents: u64,

    /// Number of stored `seen` edges
    pub total_links: u64,
}

/// Loads statistics from storage
pub fn load_statistics<S: Storage + ?Sized>(storage: &S) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_documents: storage.count_documents()?,
        total_links: storage.count_links()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");
    println!("  Documents: {}", stats.total_documents);
    println!("  Links: {}", stats.total_links);

    if stats.total_documents > 0 {
        println!(
            "  Average links per document: {:.1}",
            stats.total_links as f64 / stats.total_documents as f64
        );
    }
}
