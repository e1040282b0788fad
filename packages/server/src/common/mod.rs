// Common types and utilities shared across the application

pub mod error;
pub mod table;

pub use error::{ScrapeError, ScrapeResult};
pub use table::{parse_number, CellValue, NormalizedTable, RawRow};
