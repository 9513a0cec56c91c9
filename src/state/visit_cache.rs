use dashmap::DashMap;
use std::sync::Arc;

/// Run-scoped concurrent set of URLs already scheduled or crawled
///
/// Cloning the cache shares the underlying set, so one instance can be handed
/// to the engine and inspected by the caller afterwards. Separate instances
/// never see each other's entries.
#[derive(Debug, Clone, Default)]
pub struct VisitCache {
    entries: Arc<DashMap<String, bool>>,
}

impl VisitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks for `url` and marks it present
    ///
    /// Returns `true` if the URL was already present. For any URL exactly one
    /// caller observes `false`, even under concurrent calls.
    pub fn load_or_mark(&self, url: &str) -> bool {
        let mut already_present = true;
        self.entries.entry(url.to_string()).or_insert_with(|| {
            already_present = false;
            true
        });
        already_present
    }

    /// Returns true if the URL has been marked
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Number of marked URLs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
