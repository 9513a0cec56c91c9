use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "spider.toml";

/// Environment variable overriding `store.database-uri`
pub const DATABASE_URI_ENV: &str = "SPIDER_DATABASE_URI";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed configuration (not yet validated)
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_config_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Loads the process configuration
///
/// Defaults are overlaid with the explicit file (or `spider.toml` in the
/// working directory when it exists), then with the environment. The result
/// is validated before it is returned.
///
/// # Arguments
///
/// * `path` - Explicit configuration file; it must exist when given
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use spider_index::config::load_config;
///
/// let config = load_config(Some(Path::new("spider.toml"))).unwrap();
/// println!("Page slots: {}", config.crawler.max_concurrent_pages);
/// ```
pub fn load_config(path: Option<&Path>) -> ConfigResult<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                load_config_file(fallback)?
            } else {
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides using the given variable lookup
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(uri) = lookup(DATABASE_URI_ENV).filter(|v| !v.trim().is_empty()) {
        config.store.database_uri = uri;
    }
}
