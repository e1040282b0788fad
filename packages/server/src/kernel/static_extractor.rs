//! Static extractor - one HTTP GET plus HTML parsing
//!
//! This implementation:
//! - Uses reqwest with a browser-like User-Agent
//! - Uses the scraper crate for HTML parsing
//! - Emits one positional row per table row (or ARIA row)
//!
//! Limitations:
//! - No JavaScript rendering (pages populated by scripts yield few rows)

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::html_rows::{self, ParsedRow};
use super::BaseExtractor;
use crate::common::{RawRow, ScrapeError, ScrapeResult};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for [`StaticExtractor`].
#[derive(Debug, Clone)]
pub struct StaticExtractorConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for StaticExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Cheap extraction strategy: reqwest + scraper.
pub struct StaticExtractor {
    client: reqwest::Client,
}

impl StaticExtractor {
    pub fn new(config: &StaticExtractorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL. Non-2xx responses are network errors.
    async fn fetch_html(&self, url: &str) -> ScrapeResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::network(url, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ScrapeError::network(url, format!("Failed to read response body: {}", e)))
    }
}

#[async_trait]
impl BaseExtractor for StaticExtractor {
    async fn extract(&self, url: &str, cancel: &CancellationToken) -> ScrapeResult<Vec<RawRow>> {
        debug!(url = %url, extractor = "static", "Fetching page");

        let html = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            result = self.fetch_html(url) => result?,
        };

        let rows = html_rows::parse_rows(&html);
        if rows.is_empty() {
            warn!(url = %url, extractor = "static", "No row-like elements found");
        }

        info!(url = %url, extractor = "static", rows = rows.len(), "Extracted rows");
        Ok(rows
            .into_iter()
            .map(ParsedRow::into_positional_row)
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
