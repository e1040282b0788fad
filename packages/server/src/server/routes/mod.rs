// HTTP routes
pub mod health;
pub mod scrape;
pub mod stats;

pub use health::*;
pub use scrape::*;
pub use stats::*;
