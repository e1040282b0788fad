use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the scrape pipeline.
///
/// Category-scoped errors (`Network`, `Parse`, `Browser`) are absorbed by the
/// orchestrator. Everything else escapes the run and fails the job.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Scrape job {0} not found")]
    NotFound(Uuid),

    #[error("cancelled")]
    Cancelled,

    #[error("scrape queue is full")]
    QueueFull,
}

impl ScrapeError {
    pub fn network(url: &str, message: impl ToString) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn parse(url: &str, message: impl ToString) -> Self {
        Self::Parse {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn browser(url: &str, message: impl ToString) -> Self {
        Self::Browser {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error only affects the category being scraped.
    pub fn is_category_scoped(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Parse { .. } | Self::Browser { .. }
        )
    }
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;
