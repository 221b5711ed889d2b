// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::*;
use crate::errors;

/// Groq (OpenAI-compatible) model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API key; `None` leaves the CLI usable but every model call fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint root, e.g. "https://api.groq.com/openai"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Attempts per call, first try included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Course page scraping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Firecrawl key (optional - direct HTML fetch is used without it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firecrawl_api_key: Option<String>,

    #[serde(default = "default_firecrawl_url")]
    pub firecrawl_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            firecrawl_url: default_firecrawl_url(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_GROQ_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GROQ_BASE_URL.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_firecrawl_url() -> String {
    DEFAULT_FIRECRAWL_URL.to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub groq: GroqConfig,

    pub scraper: ScraperConfig,

    /// Where data.json, settings.json and the outbox live
    pub data_dir: PathBuf,

    /// Bind address for `coursesync serve`
    pub bind_address: String,
}

impl Config {
    /// Defaults rooted at the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            groq: GroqConfig::default(),
            scraper: ScraperConfig::default(),
            data_dir,
            bind_address: DEFAULT_HTTP_ADDR.to_string(),
        }
    }

    /// Whether model calls can be attempted at all
    pub fn has_groq_key(&self) -> bool {
        self.groq
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_address.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!("Invalid bind address: '{}'", self.bind_address),
                "Bind address should be in format 'IP:PORT'\n\
                 Examples:\n  \
                 • 127.0.0.1:8000\n  \
                 • 0.0.0.0:8080"
            ));
        }

        if !self.groq.base_url.starts_with("http://") && !self.groq.base_url.starts_with("https://")
        {
            anyhow::bail!("groq.base_url must be an http(s) URL, got '{}'", self.groq.base_url);
        }

        if self.groq.model.trim().is_empty() {
            anyhow::bail!("groq.model must not be empty");
        }

        if self.groq.max_retries == 0 {
            anyhow::bail!("groq.max_retries must be at least 1");
        }

        if self.groq.timeout_seconds == 0 {
            anyhow::bail!("groq.timeout_seconds must be greater than 0");
        }

        if self.groq.timeout_seconds > 600 {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!("groq.timeout_seconds ({}) is very high", self.groq.timeout_seconds),
                "Recommended range: 10-120 seconds"
            ));
        }

        Ok(())
    }
}
