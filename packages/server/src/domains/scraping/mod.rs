//! NCAA stats scraping: extract, normalize, load, and job tracking.

pub mod categories;
pub mod demo;
pub mod jobs;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod schema;

pub use categories::{Category, Sport};
pub use loader::{load, LoadTarget, TargetMode};
pub use normalize::{canonical_column_name, normalize, NullPolicy};
pub use orchestrator::{CategoryOrchestrator, MIN_STATIC_ROWS};
