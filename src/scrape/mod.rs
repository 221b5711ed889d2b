// Course page scraping
//
// Firecrawl renders pages to markdown when a key is configured; otherwise the
// page is fetched directly and reduced to readable text.

use anyhow::Result;
use async_trait::async_trait;

mod firecrawl;
mod html;

pub use firecrawl::FirecrawlScraper;
pub use html::{extract_text, HtmlScraper};

use crate::config::ScraperConfig;

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Return the readable content of `url`; empty when nothing was found
    async fn scrape(&self, url: &str) -> Result<String>;
}

/// Reject anything that is not an absolute http(s) URL before touching the network
pub fn validate_url(url: &str) -> Result<reqwest::Url> {
    let parsed = reqwest::Url::parse(url.trim())
        .map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => anyhow::bail!("Unsupported URL scheme '{}' (use http or https)", other),
    }
}

/// Firecrawl first (when configured), then a direct fetch
pub struct FallbackScraper {
    primary: Option<FirecrawlScraper>,
    fallback: HtmlScraper,
}

impl FallbackScraper {
    pub fn new(primary: Option<FirecrawlScraper>, fallback: HtmlScraper) -> Self {
        Self { primary, fallback }
    }

    pub fn from_config(config: &ScraperConfig, timeout_seconds: u64) -> Result<Self> {
        let primary = match config.firecrawl_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(FirecrawlScraper::new(
                key.to_string(),
                config.firecrawl_url.clone(),
                timeout_seconds,
            )?),
            _ => {
                tracing::info!("FIRECRAWL_API_KEY not set; course pages will be fetched directly");
                None
            }
        };
        Ok(Self::new(primary, HtmlScraper::new(timeout_seconds)?))
    }
}

#[async_trait]
impl PageScraper for FallbackScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        let url = validate_url(url)?;

        if let Some(firecrawl) = &self.primary {
            match firecrawl.scrape(url.as_str()).await {
                Ok(content) if !content.trim().is_empty() => return Ok(content),
                Ok(_) => tracing::warn!(%url, "Firecrawl returned no content, fetching directly"),
                Err(e) => tracing::warn!(%url, "Firecrawl failed, fetching directly: {:#}", e),
            }
        }

        self.fallback.scrape(url.as_str()).await
    }
}
