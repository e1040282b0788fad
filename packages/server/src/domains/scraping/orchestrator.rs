//! Per-sport category scrape with static-to-dynamic escalation.
//!
//! ```text
//! for category in Category::for_sport(sport):
//!     static extract ──► < MIN_STATIC_ROWS? ──► dynamic extract
//!                               │
//!                               └─► normalize ──► table[category]
//! ```
//!
//! Category-scoped failures are logged and leave an empty table for that
//! category. Cancellation aborts the whole run.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::categories::{Category, Sport};
use super::normalize::{normalize, NullPolicy};
use crate::common::{NormalizedTable, RawRow, ScrapeError, ScrapeResult};
use crate::kernel::{BaseExtractor, ServerDeps};

/// Fewer static rows than this triggers the headless browser.
pub const MIN_STATIC_ROWS: usize = 5;

pub struct CategoryOrchestrator {
    static_extractor: Arc<dyn BaseExtractor>,
    dynamic_extractor: Arc<dyn BaseExtractor>,
    base_url: String,
    null_policy: NullPolicy,
}

impl CategoryOrchestrator {
    pub fn new(
        static_extractor: Arc<dyn BaseExtractor>,
        dynamic_extractor: Arc<dyn BaseExtractor>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            static_extractor,
            dynamic_extractor,
            base_url: base_url.into(),
            null_policy: NullPolicy::KeepNull,
        }
    }

    pub fn from_deps(deps: &ServerDeps) -> Self {
        Self::new(
            deps.static_extractor.clone(),
            deps.dynamic_extractor.clone(),
            deps.stats_base_url.clone(),
        )
    }

    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Scrape every category of `sport` for `season`.
    ///
    /// Every category is present in the result, empty when it failed.
    pub async fn run(
        &self,
        sport: Sport,
        season: &str,
        cancel: &CancellationToken,
    ) -> ScrapeResult<BTreeMap<Category, NormalizedTable>> {
        let mut tables = BTreeMap::new();

        for &category in Category::for_sport(sport) {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }

            let url = category.source_url(&self.base_url, sport, season);
            let table = match self.scrape_category(&url, cancel).await {
                Ok(rows) => normalize(&rows, self.null_policy),
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) if e.is_category_scoped() => {
                    warn!(
                        sport = %sport,
                        category = %category,
                        url = %url,
                        error = %e,
                        "Category scrape failed, continuing"
                    );
                    NormalizedTable::empty()
                }
                Err(e) => return Err(e),
            };

            info!(
                sport = %sport,
                category = %category,
                rows = table.len(),
                columns = table.columns().len(),
                "Category scraped"
            );
            tables.insert(category, table);
        }

        Ok(tables)
    }

    /// Static first; escalate to the dynamic strategy when it comes back thin.
    async fn scrape_category(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> ScrapeResult<Vec<RawRow>> {
        let static_rows = match self.static_extractor.extract(url, cancel).await {
            Ok(rows) => rows,
            Err(ScrapeError::Parse { message, .. }) => {
                debug!(url = %url, error = %message, "Static parse failed, treating as zero rows");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if static_rows.len() >= MIN_STATIC_ROWS {
            return Ok(static_rows);
        }

        info!(
            url = %url,
            static_rows = static_rows.len(),
            threshold = MIN_STATIC_ROWS,
            from = self.static_extractor.name(),
            to = self.dynamic_extractor.name(),
            "Escalating to dynamic extraction"
        );

        match self.dynamic_extractor.extract(url, cancel).await {
            Ok(rows) => Ok(rows),
            Err(ScrapeError::Parse { message, .. }) => {
                debug!(url = %url, error = %message, "Dynamic parse failed, treating as zero rows");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
