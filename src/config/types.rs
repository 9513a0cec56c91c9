use serde::Deserialize;

/// Main configuration structure for spider-index
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Maximum number of concurrent link validation probes
    #[serde(rename = "max-concurrent-probes")]
    pub max_concurrent_probes: u32,

    /// Timeout for page fetches and link probes (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum recursion depth from the seed (unbounded when absent)
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Maximum number of pages crawled in one run (unbounded when absent)
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages: 20,
            max_concurrent_probes: 64,
            request_timeout_secs: 30,
            max_depth: None,
            max_pages: None,
            user_agent: format!("spider-index/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection URI: a SQLite path, `sqlite://<path>` or `:memory:`
    #[serde(rename = "database-uri")]
    pub database_uri: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_uri: "spider.db".to_string(),
        }
    }
}

/// External tokenizer process configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Program to run; the in-process normalizer is used when absent
    pub command: Option<String>,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Deadline for one tokenizer invocation (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of URLs returned by a search
    #[serde(rename = "max-results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}
