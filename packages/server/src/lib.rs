// Sports stats scraper - API Core
//
// This crate scrapes per-category player stat tables from the NCAA stats site,
// normalizes them and appends them to Postgres behind a small job API.
// Architecture follows domain-driven design; extraction strategies live behind
// kernel traits so jobs can run against mocks in tests.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
