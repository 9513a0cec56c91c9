/// Crawl phase definitions for tracking one page through the engine
use std::fmt;

/// Represents the current phase of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Page task was spawned and waits for a page slot
    Queued,

    /// Page body is being downloaded
    Fetching,

    /// Anchor targets are being resolved and filtered
    Extracting,

    /// Candidate links are being probed and deduplicated
    ValidatingLinks,

    /// Token index and inbound references are being built
    Indexing,

    /// Document is being written to the store
    Persisting,

    // ===== Terminal Phases =====
    /// Document was persisted
    Done,

    /// Fetch or body read failed; the branch ends without retry
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further processing happens after this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the engine may move a page from `self` to `next`
    ///
    /// Every active phase may fail. Otherwise phases advance strictly in order.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Failed {
            return true;
        }
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Extracting, Self::ValidatingLinks)
                | (Self::ValidatingLinks, Self::Indexing)
                | (Self::Indexing, Self::Persisting)
                | (Self::Persisting, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::ValidatingLinks => "validating_links",
            Self::Indexing => "indexing",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
