// TestDependencies - mock implementations for testing
//
// Provides mock extractors that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use super::BaseExtractor;
use crate::common::{CellValue, RawRow, ScrapeError, ScrapeResult};

// =============================================================================
// Mock Extractor
// =============================================================================

/// Canned outcome for a mocked extraction.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Rows(Vec<RawRow>),
    NetworkError(String),
    /// Page fetched but not understood
    ParseError(String),
    BrowserError(String),
    /// Block until the call is cancelled
    WaitForCancel,
}

pub struct MockExtractor {
    name: &'static str,
    /// (url fragment, response); first match wins
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    fallback: MockResponse,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    /// Mock that returns no rows for every URL.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            routes: Arc::new(Mutex::new(Vec::new())),
            fallback: MockResponse::Rows(Vec::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return `rows` for URLs containing `url_fragment`.
    pub fn with_rows(self, url_fragment: &str, rows: Vec<RawRow>) -> Self {
        self.with_response(url_fragment, MockResponse::Rows(rows))
    }

    pub fn with_response(self, url_fragment: &str, response: MockResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((url_fragment.to_string(), response));
        self
    }

    /// Response for URLs no route matches.
    pub fn with_fallback(mut self, response: MockResponse) -> Self {
        self.fallback = response;
        self
    }

    /// URLs requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn was_called_with(&self, url_fragment: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|url| url.contains(url_fragment))
    }

    fn response_for(&self, url: &str) -> MockResponse {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl BaseExtractor for MockExtractor {
    async fn extract(&self, url: &str, cancel: &CancellationToken) -> ScrapeResult<Vec<RawRow>> {
        self.calls.lock().unwrap().push(url.to_string());

        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        match self.response_for(url) {
            MockResponse::Rows(rows) => Ok(rows),
            MockResponse::NetworkError(message) => Err(ScrapeError::network(url, message)),
            MockResponse::ParseError(message) => Err(ScrapeError::parse(url, message)),
            MockResponse::BrowserError(message) => Err(ScrapeError::browser(url, message)),
            MockResponse::WaitForCancel => {
                cancel.cancelled().await;
                Err(ScrapeError::Cancelled)
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// =============================================================================
// Row fixtures
// =============================================================================

/// `count` distinct basketball scoring rows with named columns.
pub fn basketball_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            RawRow::new()
                .with("Player Name", format!("Player {}", i))
                .with("Team Name", format!("Team {}", i % 4))
                .with("Games Played", CellValue::Text(format!("{}", 20 + i)))
                .with("Points Per Game", format!("{:.1}", 10.0 + i as f64))
                .with("Assists-Per-Game", "3.5")
        })
        .collect()
}

/// `count` distinct rows carrying only positional columns.
pub fn positional_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| {
            RawRow::new()
                .with("column_0", format!("{}", i + 1))
                .with("column_1", format!("Player {}", i))
        })
        .collect()
}
