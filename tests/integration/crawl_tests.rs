//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use spider_index::config::CrawlerConfig;
use spider_index::crawler::{
    build_http_client, CrawlEngine, CrawlOptions, LinkStatus, LinkValidator,
};
use spider_index::storage::{SqliteStorage, Storage};
use spider_index::VisitCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn test_options() -> CrawlOptions {
    CrawlOptions {
        max_concurrent_pages: 4,
        max_concurrent_probes: 8,
        ..CrawlOptions::from_config(&CrawlerConfig {
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        })
    }
}

fn engine(store: &Arc<Mutex<SqliteStorage>>, options: CrawlOptions) -> CrawlEngine<SqliteStorage> {
    let client = build_http_client(&CrawlerConfig {
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    })
    .expect("Failed to build client");
    CrawlEngine::new(store.clone(), client, options)
}

fn memory_store() -> Arc<Mutex<SqliteStorage>> {
    Arc::new(Mutex::new(
        SqliteStorage::open_in_memory().expect("Failed to open store"),
    ))
}

fn seed(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to parse seed")
}

#[tokio::test]
async fn test_single_page_crawl_filters_and_indexes() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r##"<html><head>
            <title>Go Crawler</title>
            <meta name="description" content="A crawler written for testing">
            </head><body>
            <h1>Crawler</h1>
            <a href="/about">About</a>
            <a href="bad.js">Script</a>
            <a href="#top">Top</a>
            </body></html>"##,
    )
    .await;
    mount_page(&server, "/about", "<html><title>About</title></html>").await;

    // Excluded by suffix, so never probed
    Mock::given(method("GET"))
        .and(path("/bad.js"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = memory_store();
    let report = engine(&store, test_options()).run(seed(&server, "/")).await;

    assert_eq!(report.pages_inserted, 1);
    assert_eq!(report.links_accepted, 1);
    assert_eq!(report.pages_failed, 0);

    let store = store.lock().await;
    let doc = store
        .find(&format!("{}/", base))
        .unwrap()
        .expect("Seed was not stored");

    assert_eq!(doc.seen, vec![format!("{}/about", base)]);
    assert_eq!(doc.index.get("crawler"), Some(&3));
    assert_eq!(doc.index.get("go"), Some(&1));
    assert!(doc.references.is_empty());

    // Non-recursive: the accepted link is not crawled
    assert_eq!(store.count_documents().unwrap(), 1);
}

#[tokio::test]
async fn test_recursive_crawl_visits_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a><a href="/contact">Contact</a><a href="/missing">Missing</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<title>About us</title><a href="/">Home</a><a href="/contact">Contact</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/contact",
        r#"<title>Contact</title><a href="/about">About</a><a href="/">Home</a>"#,
    )
    .await;
    // /missing is unmatched and answers 404

    let store = memory_store();
    let visited = VisitCache::new();
    let options = CrawlOptions {
        recursive: true,
        ..test_options()
    };
    let report = engine(&store, options)
        .with_visit_cache(visited.clone())
        .run(seed(&server, "/"))
        .await;

    assert_eq!(report.pages_inserted, 3);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(visited.len(), 3);
    assert!(!visited.contains(&format!("{}/missing", base)));

    let store = store.lock().await;
    assert_eq!(store.count_documents().unwrap(), 3);

    let root = store.find(&format!("{}/", base)).unwrap().unwrap();
    let mut root_seen = root.seen.clone();
    root_seen.sort();
    assert_eq!(
        root_seen,
        vec![format!("{}/about", base), format!("{}/contact", base)]
    );

    // Every URL is accepted into at most one page's seen list
    let mut all_seen: Vec<String> = store
        .find_all()
        .unwrap()
        .into_iter()
        .flat_map(|doc| doc.seen)
        .collect();
    let total = all_seen.len();
    all_seen.sort();
    all_seen.dedup();
    assert_eq!(all_seen.len(), total);

    // Children are persisted after their parent
    let about = store.find(&format!("{}/about", base)).unwrap().unwrap();
    assert!(about.references.contains(&format!("{}/", base)));
    let contact = store.find(&format!("{}/contact", base)).unwrap().unwrap();
    assert!(contact.references.contains(&format!("{}/", base)));
}

#[tokio::test]
async fn test_update_mode_refreshes_seen() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<title>Home</title><a href="/new">New</a>"#).await;
    mount_page(&server, "/new", "<title>New</title>").await;

    let store = memory_store();
    let root = format!("{}/", base);
    {
        let mut first = spider_index::Document::new(
            root.clone(),
            chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        );
        first.seen = vec![format!("{}/old", base)];
        first.index.insert("stale".to_string(), 2);
        store.lock().await.insert(&first).unwrap();
    }

    let options = CrawlOptions {
        update: true,
        ..test_options()
    };
    let report = engine(&store, options).run(seed(&server, "/")).await;
    assert_eq!(report.pages_updated, 1);
    assert_eq!(report.pages_inserted, 0);

    let store = store.lock().await;
    let doc = store.find(&root).unwrap().unwrap();
    assert_eq!(doc.seen, vec![format!("{}/new", base)]);
    assert!(doc.time > chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    // Only seen and time are refreshed
    assert_eq!(doc.index.get("stale"), Some(&2));
    assert_eq!(store.count_documents().unwrap(), 1);
}

#[tokio::test]
async fn test_existing_page_is_skipped_without_update() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/x">X</a>"#).await;

    let store = memory_store();
    let root = format!("{}/", server.uri());
    store
        .lock()
        .await
        .insert(&spider_index::Document::new(
            root.clone(),
            chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        ))
        .unwrap();

    let report = engine(&store, test_options()).run(seed(&server, "/")).await;
    assert_eq!(report.pages_skipped, 1);

    let doc = store.lock().await.find(&root).unwrap().unwrap();
    assert!(doc.seen.is_empty());
}

#[tokio::test]
async fn test_failed_child_does_not_affect_siblings() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/good">Good</a><a href="/slow">Slow</a>"#,
    )
    .await;
    mount_page(&server, "/good", "<title>Good</title>").await;

    // Answers the probe, then stalls past the fetch timeout
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(10)))
        .mount(&server)
        .await;

    let store = memory_store();
    let client = build_http_client(&CrawlerConfig {
        request_timeout_secs: 1,
        ..CrawlerConfig::default()
    })
    .unwrap();
    let options = CrawlOptions {
        recursive: true,
        ..test_options()
    };
    let report = CrawlEngine::new(store.clone(), client, options)
        .run(seed(&server, "/"))
        .await;

    assert_eq!(report.pages_inserted, 2);
    assert_eq!(report.pages_failed, 1);

    let store = store.lock().await;
    assert!(store.exists(&format!("{}/good", base)).unwrap());
    assert!(!store.exists(&format!("{}/slow", base)).unwrap());
}

#[tokio::test]
async fn test_page_cap_limits_recursion() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount_page(&server, route, "<title>Leaf</title>").await;
    }

    let store = memory_store();
    let options = CrawlOptions {
        recursive: true,
        max_pages: Some(2),
        ..test_options()
    };
    let report = engine(&store, options).run(seed(&server, "/")).await;

    assert_eq!(report.pages_inserted, 2);
    assert_eq!(report.links_accepted, 3);
    assert_eq!(report.links_capped, 2);
    assert_eq!(store.lock().await.count_documents().unwrap(), 2);
}

#[tokio::test]
async fn test_depth_cap_limits_recursion() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/one">1</a>"#).await;
    mount_page(&server, "/one", r#"<a href="/two">2</a>"#).await;
    mount_page(&server, "/two", "<title>Deep</title>").await;

    let store = memory_store();
    let options = CrawlOptions {
        recursive: true,
        max_depth: Some(1),
        ..test_options()
    };
    let report = engine(&store, options).run(seed(&server, "/")).await;

    assert_eq!(report.pages_inserted, 2);
    let store = store.lock().await;
    assert!(!store.exists(&format!("{}/two", server.uri())).unwrap());
    let one = store.find(&format!("{}/one", server.uri())).unwrap().unwrap();
    assert_eq!(one.seen, vec![format!("{}/two", server.uri())]);
}

/// Serves every page with a fixed delay and tracks how many overlapped
///
/// A request counts as in flight until its delay has elapsed, so the
/// high-water mark is the largest number of requests the server held at once.
struct SlowPages {
    delay: Duration,
    arrivals: std::sync::Mutex<Vec<Instant>>,
    high_water: Arc<AtomicUsize>,
}

impl Respond for SlowPages {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let now = Instant::now();
        // Margin for scheduling jitter between response and next request
        let window = self.delay - Duration::from_millis(50);

        let mut arrivals = self.arrivals.lock().unwrap();
        let in_flight = arrivals
            .iter()
            .filter(|t| now.duration_since(**t) < window)
            .count()
            + 1;
        arrivals.push(now);
        self.high_water.fetch_max(in_flight, Ordering::SeqCst);

        let body = if request.url.path() == "/" {
            (0..6)
                .map(|i| format!(r#"<a href="/page{}">{}</a>"#, i, i))
                .collect::<String>()
        } else {
            "<title>Leaf</title>".to_string()
        };
        html(&body).set_delay(self.delay)
    }
}

/// Accepts every link and tracks how many checks overlapped
struct SlowValidator {
    current: AtomicUsize,
    high_water: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowValidator {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LinkValidator for SlowValidator {
    async fn probe(&self, _url: &str) -> LinkStatus {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(100)).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        LinkStatus::Live(200)
    }
}

#[tokio::test]
async fn test_page_fetches_respect_slot_pool() {
    let server = MockServer::start().await;
    let high_water = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .respond_with(SlowPages {
            delay: Duration::from_millis(300),
            arrivals: std::sync::Mutex::new(Vec::new()),
            high_water: high_water.clone(),
        })
        .mount(&server)
        .await;

    let store = memory_store();
    let options = CrawlOptions {
        recursive: true,
        max_concurrent_pages: 2,
        ..test_options()
    };
    // Probes never reach the server, so every request is a page fetch
    let report = engine(&store, options)
        .with_validator(Arc::new(SlowValidator::new()))
        .run(seed(&server, "/"))
        .await;

    assert_eq!(report.pages_inserted, 7);
    let peak = high_water.load(Ordering::SeqCst);
    assert!(peak <= 2, "{} page fetches overlapped", peak);
    assert!(peak >= 2, "page fetches never overlapped");
}

#[tokio::test]
async fn test_link_checks_respect_probe_pool() {
    let server = MockServer::start().await;

    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/link{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;

    let validator = Arc::new(SlowValidator::new());
    let options = CrawlOptions {
        max_concurrent_probes: 3,
        ..test_options()
    };
    let report = engine(&memory_store(), options)
        .with_validator(validator.clone())
        .run(seed(&server, "/"))
        .await;

    assert_eq!(report.links_accepted, 12);
    assert_eq!(validator.calls.load(Ordering::SeqCst), 12);
    let peak = validator.high_water.load(Ordering::SeqCst);
    assert!(peak <= 3, "{} link checks overlapped", peak);
    assert!(peak >= 2, "link checks never overlapped");
}
