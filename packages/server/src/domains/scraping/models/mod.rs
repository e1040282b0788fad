pub mod basketball_stats;
pub mod football_stats;
pub mod scrape_job;
pub mod scraped_data;

pub use basketball_stats::*;
pub use football_stats::*;
pub use scrape_job::*;
pub use scraped_data::{ScrapedData, SOURCE_NCAA};
