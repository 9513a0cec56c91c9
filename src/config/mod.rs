//! Configuration module for spider-index
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! and applying environment overrides.
//!
//! # Example
//!
//! ```no_run
//! use spider_index::config::load_config;
//!
//! let config = load_config(None).unwrap();
//! println!("Store: {}", config.store.database_uri);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SearchConfig, StoreConfig, TokenizerConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, load_config_file, DATABASE_URI_ENV, DEFAULT_CONFIG_FILE,
};
pub use validation::validate;
