//! Kernel module - server infrastructure and dependencies.

pub mod chrome_extractor;
pub mod deps;
pub mod html_rows;
pub mod jobs;
pub mod static_extractor;
pub mod test_dependencies;
pub mod traits;

pub use chrome_extractor::{BrowserConfig, ChromeExtractor};
pub use deps::ServerDeps;
pub use jobs::{JobHandler, PoolConfig, WorkerPool};
pub use static_extractor::{StaticExtractor, StaticExtractorConfig, DEFAULT_USER_AGENT};
pub use test_dependencies::{MockExtractor, MockResponse};
pub use traits::*;
