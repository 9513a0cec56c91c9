use crate::config::types::{Config, CrawlerConfig, SearchConfig, StoreConfig, TokenizerConfig};
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_store_config(&config.store)?;
    validate_tokenizer_config(&config.tokenizer)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 1000 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 1000, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.max_concurrent_probes < 1 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-probes must be >= 1, got {}",
            config.max_concurrent_probes
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_uri.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-uri cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates tokenizer configuration
fn validate_tokenizer_config(config: &TokenizerConfig) -> Result<(), ConfigError> {
    if let Some(command) = &config.command {
        if command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tokenizer command cannot be empty when set".to_string(),
            ));
        }
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "tokenizer timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_results < 1 {
        return Err(ConfigError::Validation(
            "max-results must be >= 1".to_string(),
        ));
    }
    Ok(())
}
