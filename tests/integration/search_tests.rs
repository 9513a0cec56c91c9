//! Integration tests for search over a crawled store

use chrono::NaiveDate;
use spider_index::config::CrawlerConfig;
use spider_index::crawler::{build_http_client, CrawlEngine, CrawlOptions};
use spider_index::index::{LocalTokenizer, TokenizerAdapter};
use spider_index::storage::{open_storage, Document, SqliteStorage, Storage};
use spider_index::SearchEngine;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn document(url: &str, index: &[(&str, u32)], references: &[&str]) -> Document {
    let mut doc = Document::new(url, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    doc.index = index.iter().map(|(t, c)| (t.to_string(), *c)).collect();
    doc.references = references.iter().map(|s| s.to_string()).collect();
    doc
}

#[tokio::test]
async fn test_search_ranks_on_disk_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("search.db");
    let uri = db_path.to_string_lossy().to_string();

    {
        let mut store = open_storage(&uri).unwrap();
        store
            .insert(&document(
                "https://a.com/",
                &[("go", 3), ("crawler", 1)],
                &["https://r1.com/", "https://r2.com/"],
            ))
            .unwrap();
        store
            .insert(&document("https://b.com/", &[("go", 1)], &[]))
            .unwrap();
        store
            .insert(&document(
                "https://c.com/",
                &[("python", 2)],
                &["https://r1.com/", "https://r2.com/", "https://r3.com/"],
            ))
            .unwrap();
    }

    // Reopen to search the persisted copy
    let store = open_storage(&uri).unwrap();
    let engine = SearchEngine::new(TokenizerAdapter::new(Arc::new(LocalTokenizer)), 10);

    let hits = engine.search(&store, "Go crawler").await.unwrap();
    let ranked: Vec<(&str, u64)> = hits.iter().map(|h| (h.url.as_str(), h.score)).collect();
    assert_eq!(ranked, vec![("https://a.com/", 6), ("https://b.com/", 1)]);

    assert!(engine.search(&store, "haskell").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ties_break_on_url() {
    let mut store = SqliteStorage::open_in_memory().unwrap();
    for url in ["https://z.com/", "https://m.com/", "https://a.com/"] {
        store.insert(&document(url, &[("rust", 2)], &[])).unwrap();
    }

    let hits = SearchEngine::default().search(&store, "rust").await.unwrap();
    let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com/", "https://m.com/", "https://z.com/"]);
}

#[tokio::test]
async fn test_unavailable_tokenizer_still_searches() {
    let mut store = SqliteStorage::open_in_memory().unwrap();
    store
        .insert(&document("https://a.com/", &[("spider", 1)], &[]))
        .unwrap();

    let broken = TokenizerAdapter::from_config(&spider_index::config::TokenizerConfig {
        command: Some("/nonexistent/spider-index-normalizer".to_string()),
        args: Vec::new(),
        timeout_secs: 2,
    });
    let engine = SearchEngine::new(broken, 10);

    let hits = engine.search(&store, "SPIDER!").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://a.com/");
}

#[tokio::test]
async fn test_crawl_then_search() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Rust spiders</title></head>
            <body><a href="/guide">Guide</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Spider guide</title></head><body><h2>Rust</h2></body></html>"#,
        ))
        .mount(&server)
        .await;

    let store = Arc::new(Mutex::new(SqliteStorage::open_in_memory().unwrap()));
    let client = build_http_client(&CrawlerConfig::default()).unwrap();
    let options = CrawlOptions {
        recursive: true,
        ..CrawlOptions::default()
    };
    CrawlEngine::new(store.clone(), client, options)
        .run(Url::parse(&format!("{}/", base)).unwrap())
        .await;

    let store = store.lock().await;
    let hits = SearchEngine::default().search(&*store, "spider").await.unwrap();

    // Guide: spider(1) + 1 reference from the root
    let ranked: Vec<(String, u64)> = hits.into_iter().map(|h| (h.url, h.score)).collect();
    assert_eq!(
        ranked,
        vec![(format!("{}/guide", base), 2)]
    );
}
