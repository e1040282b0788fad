//! Server dependencies for scrape jobs (using traits for testability)
//!
//! This module provides the central dependency container used by the scraping
//! domain. Both extraction strategies sit behind `BaseExtractor` so tests can
//! swap in mocks.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::kernel::{BaseExtractor, ChromeExtractor, StaticExtractor};

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to jobs and routes
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Cheap strategy, tried first for every category
    pub static_extractor: Arc<dyn BaseExtractor>,
    /// Headless browser strategy, used when the static pass comes back thin
    pub dynamic_extractor: Arc<dyn BaseExtractor>,
    /// Root of the stats site, e.g. `https://www.ncaa.com/stats`
    pub stats_base_url: String,
    pub default_season: String,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        static_extractor: Arc<dyn BaseExtractor>,
        dynamic_extractor: Arc<dyn BaseExtractor>,
        stats_base_url: impl Into<String>,
        default_season: impl Into<String>,
    ) -> Self {
        Self {
            db_pool,
            static_extractor,
            dynamic_extractor,
            stats_base_url: stats_base_url.into(),
            default_season: default_season.into(),
        }
    }

    /// Production wiring: reqwest for static pages, Chromium for dynamic ones.
    pub fn from_config(db_pool: PgPool, config: &Config) -> Result<Self> {
        let static_extractor = StaticExtractor::new(&config.static_extractor())?;
        let dynamic_extractor = ChromeExtractor::new(config.browser());

        Ok(Self::new(
            db_pool,
            Arc::new(static_extractor),
            Arc::new(dynamic_extractor),
            config.stats_base_url.clone(),
            config.default_season.clone(),
        ))
    }
}
