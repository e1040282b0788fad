// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Escalation between extractors and loading live in the scraping domain.
//
// Naming convention: Base* for trait names (e.g., BaseExtractor)

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::common::{RawRow, ScrapeResult};

// =============================================================================
// Extraction Trait (Infrastructure - turns one URL into raw rows)
// =============================================================================

#[async_trait]
pub trait BaseExtractor: Send + Sync {
    /// Fetch `url` and return one raw row per row-like element.
    ///
    /// Implementations must return `ScrapeError::Cancelled` promptly once
    /// `cancel` fires and release any resources they acquired.
    async fn extract(&self, url: &str, cancel: &CancellationToken) -> ScrapeResult<Vec<RawRow>>;

    /// Short name used in logs ("static", "chrome", ...)
    fn name(&self) -> &'static str;
}
