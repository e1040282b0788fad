//! Dynamic extractor - headless Chromium `--dump-dom`
//!
//! Every call launches its own browser process with a throwaway profile
//! directory. The process is spawned with `kill_on_drop`, so dropping the
//! output future (timeout, cancellation, error) kills it, and the profile
//! `TempDir` is removed when the session scope ends.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::html_rows::{self, ParsedRow};
use super::BaseExtractor;
use crate::common::{CellValue, RawRow, ScrapeError, ScrapeResult};

/// Extra wall-clock time a render may take on top of its virtual time budget.
const PROCESS_GRACE: Duration = Duration::from_secs(20);

/// Max stderr bytes carried into an error message.
const STDERR_SNIPPET: usize = 500;

/// Headless browser settings. Passed in explicitly; nothing is read from the
/// environment here.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub chrome_bin: String,
    pub window_size: (u32, u32),
    /// How long the page may run scripts before the DOM is dumped.
    pub wait_timeout: Duration,
    /// Extra settle time used when the data container did not appear.
    pub settle_delay: Duration,
    /// CSS selector that marks a populated page.
    pub container_selector: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_bin: "chromium".to_string(),
            window_size: (1920, 1080),
            wait_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(5),
            container_selector: "table".to_string(),
        }
    }
}

/// Heavy extraction strategy: isolated headless Chromium per call.
pub struct ChromeExtractor {
    config: BrowserConfig,
}

impl ChromeExtractor {
    pub fn new(config: BrowserConfig) -> Self {
        info!(chrome_bin = %config.chrome_bin, "Using ChromeExtractor (dump-dom)");
        Self { config }
    }

    fn launch_args(&self, profile_dir: &Path, budget: Duration, url: &str) -> Vec<String> {
        let (width, height) = self.config.window_size;
        vec![
            "--headless".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={},{}", width, height),
            format!("--user-data-dir={}", profile_dir.display()),
            format!("--virtual-time-budget={}", budget.as_millis()),
            "--dump-dom".to_string(),
            url.to_string(),
        ]
    }

    /// Run one browser session and return the rendered DOM.
    async fn render(
        &self,
        url: &str,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> ScrapeResult<String> {
        let profile = tempfile::tempdir()
            .map_err(|e| ScrapeError::browser(url, format!("Failed to create profile dir: {}", e)))?;

        let mut command = tokio::process::Command::new(&self.config.chrome_bin);
        command
            .args(self.launch_args(profile.path(), budget, url))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let hard_limit = budget + PROCESS_GRACE;
        debug!(url = %url, budget_ms = budget.as_millis() as u64, "Launching headless browser");

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            result = tokio::time::timeout(hard_limit, command.output()) => match result {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(ScrapeError::browser(
                        url,
                        format!("Failed to launch {}: {}", self.config.chrome_bin, e),
                    ))
                }
                Err(_) => {
                    return Err(ScrapeError::browser(
                        url,
                        format!("Browser timed out after {}s", hard_limit.as_secs()),
                    ))
                }
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let snippet: String = stderr.trim().chars().take(STDERR_SNIPPET).collect();
            return Err(ScrapeError::browser(
                url,
                format!("Browser exited with {}: {}", output.status, snippet),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn to_raw_row(url: &str, parsed: ParsedRow) -> RawRow {
        let mut row = RawRow::new()
            .with("html_content", parsed.html.as_str())
            .with("text_content", parsed.text.as_str())
            .with("tag", parsed.tag.as_str())
            .with("url", url);
        for (i, cell) in parsed.cells.into_iter().enumerate() {
            row.insert(format!("column_{}", i), CellValue::Text(cell));
        }
        row
    }
}

#[async_trait]
impl BaseExtractor for ChromeExtractor {
    async fn extract(&self, url: &str, cancel: &CancellationToken) -> ScrapeResult<Vec<RawRow>> {
        let parsed = url::Url::parse(url).map_err(|e| ScrapeError::browser(url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScrapeError::browser(
                url,
                format!("Only http/https URLs are allowed, got: {}", parsed.scheme()),
            ));
        }

        info!(url = %url, extractor = "chrome", "Rendering page");
        let mut html = self.render(url, self.config.wait_timeout, cancel).await?;

        if !html_rows::has_container(&html, &self.config.container_selector) {
            warn!(
                url = %url,
                selector = %self.config.container_selector,
                settle_secs = self.config.settle_delay.as_secs(),
                "Data container not found after wait, re-rendering with settle delay"
            );
            html = self
                .render(url, self.config.wait_timeout + self.config.settle_delay, cancel)
                .await?;
        }

        let rows: Vec<RawRow> = html_rows::parse_rows(&html)
            .into_iter()
            .map(|row| Self::to_raw_row(url, row))
            .collect();

        info!(url = %url, extractor = "chrome", rows = rows.len(), "Extracted rows");
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}
