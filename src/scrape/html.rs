// Direct page fetch with HTML -> text reduction

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

use super::PageScraper;

static CONTENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title, h1, h2, h3, h4, h5, p, li, dt, dd, th, td, pre")
        .expect("valid selector")
});

pub struct HtmlScraper {
    client: Client,
}

impl HtmlScraper {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("coursesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageScraper for HtmlScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "Fetching course page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Fetching {} failed with status {}", url, status);
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));

        let body = response.text().await.context("Failed to read page body")?;

        Ok(if is_html { extract_text(&body) } else { body.trim().to_string() })
    }
}

/// Readable text of an HTML document: one block element per line, whitespace collapsed
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();

    for element in document.select(&CONTENT) {
        // Nested matches (e.g. <p> inside <li>) would repeat text
        let nested = element
            .ancestors()
            .filter_map(scraper::ElementRef::wrap)
            .any(|ancestor| CONTENT.matches(&ancestor));
        if nested {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}
