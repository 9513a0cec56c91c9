//! spider-index main entry point
//!
//! This is the command-line interface for crawling, indexing and searching.

use anyhow::Context;
use clap::{Parser, Subcommand};
use spider_index::config::{load_config, Config};
use spider_index::crawler::{build_http_client, existing_entry, CrawlEngine, CrawlOptions};
use spider_index::index::TokenizerAdapter;
use spider_index::output;
use spider_index::search::SearchEngine;
use spider_index::storage::{open_storage, SqliteStorage};
use spider_index::url::parse_seed;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// spider-index: crawl the web, index pages, search the index
#[derive(Parser, Debug)]
#[command(name = "spider-index")]
#[command(version)]
#[command(about = "A concurrent crawler with a token index and search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults to ./spider.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from a seed URL and store one document per page
    Crawl {
        /// Seed URL (http or https)
        url: String,

        /// Refresh pages that are already stored
        #[arg(short, long)]
        update: bool,

        /// Follow accepted links
        #[arg(short, long)]
        recursive: bool,

        /// Deepest level crawled below the seed
        #[arg(long, value_name = "N")]
        max_depth: Option<u32>,

        /// Most pages crawled in this run (at least 1)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        max_pages: Option<u64>,
    },

    /// Rank stored pages against a query
    Search {
        /// Query words
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show document and link counts of the store
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!("Using store {}", config.store.database_uri);

    let storage = open_storage(&config.store.database_uri)
        .with_context(|| format!("Failed to open store at {}", config.store.database_uri))?;

    match cli.command {
        Command::Crawl {
            url,
            update,
            recursive,
            max_depth,
            max_pages,
        } => {
            let mut options = CrawlOptions::from_config(&config.crawler);
            options.update = update;
            options.recursive = recursive;
            options.max_depth = max_depth.or(options.max_depth);
            options.max_pages = max_pages.map(|n| n as usize).or(options.max_pages);

            handle_crawl(&config, storage, &url, options).await
        }
        Command::Search { query } => handle_search(&config, &storage, &query.join(" ")).await,
        Command::Stats => handle_stats(&storage),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spider_index=info,warn"),
            1 => EnvFilter::new("spider_index=debug,info"),
            2 => EnvFilter::new("spider_index=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl command
async fn handle_crawl(
    config: &Config,
    storage: SqliteStorage,
    raw_url: &str,
    mut options: CrawlOptions,
) -> anyhow::Result<()> {
    let seed = parse_seed(raw_url).with_context(|| format!("Invalid seed URL: {}", raw_url))?;

    if !options.update {
        if let Some(existing) = existing_entry(&storage, &seed)? {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            if !output::confirm_update(stdin.lock(), &mut stdout, &existing)? {
                return Ok(());
            }
            options.update = true;
        }
    }

    let client = build_http_client(&config.crawler).context("Failed to build HTTP client")?;
    let tokenizer = TokenizerAdapter::from_config(&config.tokenizer);

    let engine = CrawlEngine::new(Arc::new(Mutex::new(storage)), client, options)
        .with_tokenizer(tokenizer);
    let report = engine.run(seed).await;

    output::write_crawl_report(&mut io::stdout(), &report)?;
    Ok(())
}

/// Handles the search command
async fn handle_search(
    config: &Config,
    storage: &SqliteStorage,
    query: &str,
) -> anyhow::Result<()> {
    let engine = SearchEngine::from_config(
        &config.search,
        TokenizerAdapter::from_config(&config.tokenizer),
    );

    let hits = engine
        .search(storage, query)
        .await
        .context("Search failed")?;
    output::print_search_results(&hits)?;
    Ok(())
}

/// Handles the stats command
fn handle_stats(storage: &SqliteStorage) -> anyhow::Result<()> {
    let stats = output::load_statistics(storage)?;
    output::print_statistics(&stats);
    Ok(())
}
