//! Background jobs for the scraping domain.

mod scrape_sports;

pub use scrape_sports::{
    cancel_scrape, enqueue_scrape, execute_scrape, start_worker_pool, ScrapeJobHandler,
    ScrapeSportsJob, ScrapeWorkerPool,
};
