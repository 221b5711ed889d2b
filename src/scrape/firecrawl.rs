// Firecrawl scrape API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::PageScraper;

pub struct FirecrawlScraper {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

impl FirecrawlScraper {
    pub fn new(api_key: String, endpoint: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }
}

#[async_trait]
impl PageScraper for FirecrawlScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "Scraping via Firecrawl");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&ScrapeRequest {
                url,
                formats: ["markdown"],
            })
            .send()
            .await
            .context("Failed to send request to Firecrawl")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Firecrawl request failed\n\nStatus: {}\nBody: {}", status, body);
        }

        let parsed: ScrapeResponse = response
            .json()
            .await
            .context("Failed to parse Firecrawl response")?;

        Ok(parsed
            .data
            .and_then(|d| d.markdown)
            .unwrap_or_default())
    }
}
