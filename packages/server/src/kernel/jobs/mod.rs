//! Job infrastructure for background scrape execution.
//!
//! This module provides the kernel-level infrastructure for job execution:
//! - [`WorkerPool`] - bounded queue plus a fixed number of workers
//! - [`JobHandler`] - what a worker runs for each dequeued job
//!
//! # Domain-Specific Jobs
//!
//! Job handlers live in their respective domains.
//! This module only provides the infrastructure - business logic stays in domains.

mod pool;

pub use pool::{JobHandler, PoolConfig, WorkerPool};
