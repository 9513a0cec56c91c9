//! Crawl engine - per-page crawl orchestration
//!
//! Every page runs as its own task through the phases of [`CrawlPhase`]:
//! - Fetch the body while holding one slot of the global page pool
//! - Resolve and filter the anchor targets into candidates
//! - Probe every candidate in its own task and admit live, unseen links
//! - Build the token index and look up inbound references alongside the probes
//! - Persist the document once all of the above have joined
//!
//! In recursive mode the admitted links are crawled as child tasks after the
//! parent is persisted, and a page task only finishes once its children have.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::extract_candidates;
use crate::crawler::validator::{HttpLinkValidator, LinkValidator};
use crate::index::{PageIndexer, TokenizerAdapter};
use crate::state::{CrawlPhase, VisitCache};
use crate::storage::{Document, DocumentUpdate, Storage, StorageResult};
use chrono::Local;
use futures::future::{join_all, BoxFuture, FutureExt};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use url::Url;

/// Options controlling one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Crawl admitted links as well as the seed
    pub recursive: bool,

    /// Refresh `seen` and `time` of pages that are already stored
    pub update: bool,

    /// Deepest level crawled below the seed (unbounded when `None`)
    pub max_depth: Option<u32>,

    /// Most pages crawled in the run, seed included (unbounded when `None`)
    pub max_pages: Option<usize>,

    /// Size of the global page slot pool
    pub max_concurrent_pages: usize,

    /// Size of the link probe pool
    pub max_concurrent_probes: usize,

    /// Timeout of a single link probe
    pub probe_timeout: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

impl CrawlOptions {
    /// Builds non-recursive, insert-only options from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            recursive: false,
            update: false,
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            max_concurrent_pages: config.max_concurrent_pages as usize,
            max_concurrent_probes: config.max_concurrent_probes as usize,
            probe_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Totals of a finished crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Documents inserted
    pub pages_inserted: usize,
    /// Existing documents refreshed in update mode
    pub pages_updated: usize,
    /// Existing documents left alone because update mode was off
    pub pages_skipped: usize,
    /// Pages whose fetch or persist failed
    pub pages_failed: usize,
    /// Links admitted into some page's `seen` list
    pub links_accepted: usize,
    /// Admitted links not crawled because of the depth or page cap
    pub links_capped: usize,
}

#[derive(Default)]
struct Counters {
    pages_inserted: AtomicUsize,
    pages_updated: AtomicUsize,
    pages_skipped: AtomicUsize,
    pages_failed: AtomicUsize,
    links_accepted: AtomicUsize,
    links_capped: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> CrawlReport {
        CrawlReport {
            pages_inserted: self.pages_inserted.load(Ordering::SeqCst),
            pages_updated: self.pages_updated.load(Ordering::SeqCst),
            pages_skipped: self.pages_skipped.load(Ordering::SeqCst),
            pages_failed: self.pages_failed.load(Ordering::SeqCst),
            links_accepted: self.links_accepted.load(Ordering::SeqCst),
            links_capped: self.links_capped.load(Ordering::SeqCst),
        }
    }
}

/// How a finished page reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PersistOutcome {
    Inserted,
    Updated,
    Skipped,
}

/// Concurrent crawler writing one document per page into a shared store
pub struct CrawlEngine<S> {
    store: Arc<Mutex<S>>,
    client: Client,
    validator: Arc<dyn LinkValidator>,
    indexer: PageIndexer,
    visited: VisitCache,
    options: CrawlOptions,
}

impl<S> CrawlEngine<S>
where
    S: Storage + Send + 'static,
{
    /// Creates an engine with an HTTP validator, local tokenizer and empty visit cache
    pub fn new(store: Arc<Mutex<S>>, client: Client, options: CrawlOptions) -> Self {
        let validator = Arc::new(HttpLinkValidator::new(
            client.clone(),
            options.probe_timeout,
        ));

        Self {
            store,
            client,
            validator,
            indexer: PageIndexer::default(),
            visited: VisitCache::new(),
            options,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn LinkValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerAdapter) -> Self {
        self.indexer = PageIndexer::new(tokenizer);
        self
    }

    /// Uses an externally owned visit cache
    pub fn with_visit_cache(mut self, visited: VisitCache) -> Self {
        self.visited = visited;
        self
    }

    pub fn visit_cache(&self) -> &VisitCache {
        &self.visited
    }

    /// Crawls from `seed` until every reachable admitted page is persisted
    pub async fn run(&self, seed: Url) -> CrawlReport {
        let ctx = Arc::new(CrawlContext {
            store: self.store.clone(),
            client: self.client.clone(),
            validator: self.validator.clone(),
            indexer: self.indexer.clone(),
            visited: self.visited.clone(),
            options: self.options.clone(),
            page_slots: Semaphore::new(self.options.max_concurrent_pages.max(1)),
            probe_slots: Semaphore::new(self.options.max_concurrent_probes.max(1)),
            pages_started: AtomicUsize::new(1),
            counters: Counters::default(),
        });

        tracing::info!("Starting crawl from {}", seed);
        self.visited.load_or_mark(seed.as_str());
        crawl_page(ctx.clone(), seed, 0).await;

        let report = ctx.counters.snapshot();
        tracing::info!(
            "Crawl finished: {} inserted, {} updated, {} skipped, {} failed",
            report.pages_inserted,
            report.pages_updated,
            report.pages_skipped,
            report.pages_failed
        );
        report
    }
}

/// State shared by every task of one run
struct CrawlContext<S> {
    store: Arc<Mutex<S>>,
    client: Client,
    validator: Arc<dyn LinkValidator>,
    indexer: PageIndexer,
    visited: VisitCache,
    options: CrawlOptions,
    page_slots: Semaphore,
    probe_slots: Semaphore,
    pages_started: AtomicUsize,
    counters: Counters,
}

impl<S> CrawlContext<S>
where
    S: Storage + Send + 'static,
{
    /// Downloads a page while holding one page slot
    async fn fetch(&self, url: &Url) -> Result<String, String> {
        let _permit = self.page_slots.acquire().await.map_err(|e| e.to_string())?;

        match fetch_page(&self.client, url.as_str()).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                if status_code >= 400 {
                    tracing::warn!("{} answered HTTP {}", final_url, status_code);
                }
                Ok(body)
            }
            FetchResult::NetworkError { error } => Err(format!("Request failed: {}", error)),
            FetchResult::ReadError { error } => Err(format!("Read failed: {}", error)),
        }
    }

    /// Probes one candidate and admits it into the page's `seen` list
    ///
    /// A candidate is admitted iff it is live, not the page itself, not yet in
    /// the visit cache, not stored, and not already in `seen`.
    async fn admit_link(
        &self,
        candidate: Url,
        page_url: &str,
        seen: &Mutex<Vec<String>>,
    ) -> Option<Url> {
        let live = {
            let _permit = self.probe_slots.acquire().await.ok()?;
            self.validator.is_live(candidate.as_str()).await
        };
        if !live {
            tracing::debug!("Dead link {} on {}", candidate, page_url);
            return None;
        }

        let key = candidate.as_str();
        if key == page_url {
            return None;
        }

        if self.visited.load_or_mark(key) {
            tracing::debug!("Already visited {}", key);
            return None;
        }

        let stored = {
            let store = self.store.lock().await;
            store.exists(key)
        };
        match stored {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!("Already stored {}", key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Existence check failed for {}: {}", key, e);
                return None;
            }
        }

        let mut seen = seen.lock().await;
        if seen.iter().any(|url| url == key) {
            return None;
        }
        seen.push(key.to_string());
        drop(seen);

        Counters::bump(&self.counters.links_accepted);
        Some(candidate)
    }

    async fn lookup_references(&self, url: &str) -> Vec<String> {
        let store = self.store.lock().await;
        store.find_referencing(url).unwrap_or_else(|e| {
            tracing::warn!("Reference lookup failed for {}: {}", url, e);
            Vec::new()
        })
    }

    /// Writes a finished document under the store lock
    async fn persist(&self, doc: &Document) -> StorageResult<PersistOutcome> {
        let mut store = self.store.lock().await;

        if !store.exists(&doc.url)? {
            store.insert(doc)?;
            return Ok(PersistOutcome::Inserted);
        }

        if self.options.update {
            store.update(
                &doc.url,
                DocumentUpdate {
                    seen: &doc.seen,
                    time: doc.time,
                },
            )?;
            Ok(PersistOutcome::Updated)
        } else {
            Ok(PersistOutcome::Skipped)
        }
    }

    /// Decides whether an admitted link is crawled as a child page
    fn admit_child(&self, url: &Url, child_depth: u32) -> bool {
        if !self.options.recursive {
            return false;
        }

        if let Some(max_depth) = self.options.max_depth {
            if child_depth > max_depth {
                tracing::debug!("Depth cap reached, not crawling {}", url);
                Counters::bump(&self.counters.links_capped);
                return false;
            }
        }

        if let Some(max_pages) = self.options.max_pages {
            let started = self.pages_started.fetch_add(1, Ordering::SeqCst);
            if started >= max_pages {
                tracing::debug!("Page cap reached, not crawling {}", url);
                Counters::bump(&self.counters.links_capped);
                return false;
            }
        }

        true
    }
}

/// Traces the phase of one page
struct PhaseTracker<'a> {
    url: &'a str,
    phase: CrawlPhase,
}

impl<'a> PhaseTracker<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            phase: CrawlPhase::Queued,
        }
    }

    fn advance(&mut self, next: CrawlPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(
                "Unexpected phase change for {}: {} -> {}",
                self.url,
                self.phase,
                next
            );
        }
        tracing::trace!("{}: {} -> {}", self.url, self.phase, next);
        self.phase = next;
    }
}

/// Crawls one page, then its admitted children
fn crawl_page<S>(ctx: Arc<CrawlContext<S>>, url: Url, depth: u32) -> BoxFuture<'static, ()>
where
    S: Storage + Send + 'static,
{
    async move {
        let Some(admitted) = process_page(&ctx, &url).await else {
            return;
        };

        let child_depth = depth + 1;
        let children: Vec<_> = admitted
            .into_iter()
            .filter(|child| ctx.admit_child(child, child_depth))
            .map(|child| tokio::spawn(crawl_page(ctx.clone(), child, child_depth)))
            .collect();

        for result in join_all(children).await {
            if let Err(e) = result {
                tracing::error!("Page task under {} aborted: {}", url, e);
            }
        }
    }
    .boxed()
}

/// Runs fetch through persist for one page and returns its admitted links
async fn process_page<S>(ctx: &Arc<CrawlContext<S>>, url: &Url) -> Option<Vec<Url>>
where
    S: Storage + Send + 'static,
{
    let page_url = url.as_str();
    let mut tracker = PhaseTracker::new(page_url);

    tracker.advance(CrawlPhase::Fetching);
    let body = match ctx.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to crawl {}: {}", page_url, e);
            tracker.advance(CrawlPhase::Failed);
            Counters::bump(&ctx.counters.pages_failed);
            return None;
        }
    };

    tracker.advance(CrawlPhase::Extracting);
    let candidates = extract_candidates(&body, url);
    tracing::debug!("{} candidate links on {}", candidates.len(), page_url);

    tracker.advance(CrawlPhase::ValidatingLinks);
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();

    let index_task = {
        let indexer = ctx.indexer.clone();
        let body = body.clone();
        tokio::spawn(async move { indexer.index_html(&body).await })
    };

    let references_task = {
        let ctx = ctx.clone();
        let page_url = page_url.to_string();
        tokio::spawn(async move { ctx.lookup_references(&page_url).await })
    };

    let probes: Vec<_> = candidates
        .into_iter()
        .map(|candidate| {
            let ctx = ctx.clone();
            let seen = seen.clone();
            let page_url = page_url.to_string();
            tokio::spawn(async move { ctx.admit_link(candidate, &page_url, &seen).await })
        })
        .collect();

    let admitted: Vec<Url> = join_all(probes)
        .await
        .into_iter()
        .filter_map(|result| {
            result.unwrap_or_else(|e| {
                tracing::warn!("Link probe on {} aborted: {}", page_url, e);
                None
            })
        })
        .collect();

    tracker.advance(CrawlPhase::Indexing);
    let index = index_task.await.unwrap_or_else(|e| {
        tracing::warn!("Indexing {} aborted: {}", page_url, e);
        BTreeMap::new()
    });
    let references = references_task.await.unwrap_or_else(|e| {
        tracing::warn!("Reference lookup for {} aborted: {}", page_url, e);
        Vec::new()
    });

    tracker.advance(CrawlPhase::Persisting);
    let mut doc = Document::new(page_url, Local::now().date_naive());
    doc.seen = std::mem::take(&mut *seen.lock().await);
    doc.index = index;
    doc.references = references;

    match ctx.persist(&doc).await {
        Ok(PersistOutcome::Inserted) => Counters::bump(&ctx.counters.pages_inserted),
        Ok(PersistOutcome::Updated) => Counters::bump(&ctx.counters.pages_updated),
        Ok(PersistOutcome::Skipped) => {
            tracing::info!("{} is already stored, leaving it unchanged", page_url);
            Counters::bump(&ctx.counters.pages_skipped);
        }
        Err(e) => {
            tracing::error!("Failed to persist {}: {}", page_url, e);
            tracker.advance(CrawlPhase::Failed);
            Counters::bump(&ctx.counters.pages_failed);
            return None;
        }
    }

    log_related_pages(&doc);
    tracker.advance(CrawlPhase::Done);

    Some(admitted)
}

fn log_related_pages(doc: &Document) {
    tracing::info!("Related pages of {}: {}", doc.url, doc.seen.len());
    for (i, url) in doc.seen.iter().enumerate() {
        tracing::info!("{}. {}", i + 1, url);
    }
}
