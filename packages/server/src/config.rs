use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::kernel::{BrowserConfig, PoolConfig, StaticExtractorConfig, DEFAULT_USER_AGENT};

pub const DEFAULT_STATS_BASE_URL: &str = "https://www.ncaa.com/stats";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub scrape_workers: usize,
    pub scrape_queue_capacity: usize,
    pub stats_base_url: String,
    pub default_season: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub chrome_bin: String,
    pub chrome_wait_secs: u64,
    pub chrome_settle_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            port: env_or("PORT", 8080)?,
            scrape_workers: env_or("SCRAPE_WORKERS", 4)?,
            scrape_queue_capacity: env_or("SCRAPE_QUEUE_CAPACITY", 64)?,
            stats_base_url: env::var("NCAA_STATS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STATS_BASE_URL.to_string()),
            default_season: env::var("DEFAULT_SEASON").unwrap_or_else(|_| "2023".to_string()),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", 30)?,
            user_agent: env::var("SCRAPER_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            chrome_bin: env::var("CHROME_BIN").unwrap_or_else(|_| "chromium".to_string()),
            chrome_wait_secs: env_or("CHROME_WAIT_SECS", 10)?,
            chrome_settle_secs: env_or("CHROME_SETTLE_SECS", 5)?,
        })
    }

    pub fn static_extractor(&self) -> StaticExtractorConfig {
        StaticExtractorConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    pub fn browser(&self) -> BrowserConfig {
        BrowserConfig {
            chrome_bin: self.chrome_bin.clone(),
            wait_timeout: Duration::from_secs(self.chrome_wait_secs),
            settle_delay: Duration::from_secs(self.chrome_settle_secs),
            ..Default::default()
        }
    }

    pub fn worker_pool(&self) -> PoolConfig {
        PoolConfig {
            workers: self.scrape_workers,
            queue_capacity: self.scrape_queue_capacity,
            ..Default::default()
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
