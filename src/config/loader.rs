// Configuration loader
// Reads ~/.coursesync/config.toml, then lets environment variables override it

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::DATA_DIR_NAME;
use super::settings::{Config, GroqConfig, ScraperConfig};
use crate::errors;

/// On-disk shape of config.toml. Every section is optional.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    groq: Option<GroqConfig>,
    #[serde(default)]
    scraper: Option<ScraperConfig>,
    #[serde(default)]
    data_dir: Option<PathBuf>,
    #[serde(default)]
    bind_address: Option<String>,
}

/// Load configuration from the default location and the process environment.
///
/// A `.env` file in the working directory is loaded first so its values
/// behave like exported variables.
pub fn load_config() -> Result<Config> {
    let _ = dotenvy::dotenv();

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let default_dir = home.join(DATA_DIR_NAME);
    let config_path = default_dir.join("config.toml");

    load_config_from(&config_path, default_dir, |key| std::env::var(key).ok())
}

/// Load configuration from an explicit file, with `lookup` supplying
/// environment overrides. A missing file is not an error.
pub fn load_config_from<F>(config_path: &Path, default_data_dir: PathBuf, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::new(default_data_dir);

    if config_path.exists() {
        let contents = fs::read_to_string(config_path).map_err(|_e| {
            anyhow::anyhow!(errors::file_not_found_error(
                &config_path.display().to_string(),
                "Configuration file"
            ))
        })?;

        let toml_config: TomlConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!(errors::config_parse_error(&e.to_string())))?;

        if let Some(groq) = toml_config.groq {
            config.groq = groq;
        }
        if let Some(scraper) = toml_config.scraper {
            config.scraper = scraper;
        }
        if let Some(dir) = toml_config.data_dir {
            config.data_dir = dir;
        }
        if let Some(addr) = toml_config.bind_address {
            config.bind_address = addr;
        }
        tracing::debug!(path = %config_path.display(), "Loaded config file");
    }

    apply_env_overrides(&mut config, lookup);

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get("GROQ_API_KEY") {
        config.groq.api_key = Some(key);
    }
    if let Some(model) = get("GROQ_MODEL") {
        config.groq.model = model;
    }
    if let Some(url) = get("GROQ_BASE_URL") {
        config.groq.base_url = url;
    }
    if let Some(key) = get("FIRECRAWL_API_KEY") {
        config.scraper.firecrawl_api_key = Some(key);
    }
    if let Some(url) = get("FIRECRAWL_API_URL") {
        config.scraper.firecrawl_url = url;
    }
    if let Some(dir) = get("COURSESYNC_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(addr) = get("COURSESYNC_BIND") {
        config.bind_address = addr;
    }
}
