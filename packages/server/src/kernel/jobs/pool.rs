//! Bounded in-process worker pool for background jobs.
//!
//! # Architecture
//!
//! ```text
//! submit(job_id, payload)
//!     │
//!     ├─► register CancellationToken (child of pool shutdown token)
//!     └─► try_send on bounded queue ──► QueueFull when at capacity
//!
//! N workers (shared receiver)
//!     │
//!     ├─► recv next job
//!     ├─► JobHandler.execute(job_id, payload, token)
//!     └─► unregister token
//! ```
//!
//! Shutdown cancels every registered token. Jobs still queued at that point
//! are handed to the handler with an already-cancelled token so they can be
//! finalized instead of being left pending.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::common::{ScrapeError, ScrapeResult};

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of concurrently executing jobs
    pub workers: usize,
    /// Jobs that may wait for a free worker before submissions are rejected
    pub queue_capacity: usize,
    /// How long shutdown waits for workers to wind down
    pub shutdown_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 64,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Executes one dequeued job. Status bookkeeping is the handler's concern.
#[async_trait]
pub trait JobHandler<P>: Send + Sync + 'static {
    async fn execute(&self, job_id: Uuid, payload: P, cancel: CancellationToken) -> Result<()>;
}

struct QueuedJob<P> {
    job_id: Uuid,
    payload: P,
}

type RunningJobs = Arc<RwLock<HashMap<Uuid, CancellationToken>>>;

pub struct WorkerPool<P: Send + 'static> {
    sender: mpsc::Sender<QueuedJob<P>>,
    /// Tokens for queued and running jobs, used for cancellation
    running_jobs: RunningJobs,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl<P: Send + 'static> WorkerPool<P> {
    /// Start the pool. Workers are spawned immediately on the current runtime.
    pub fn start(config: PoolConfig, handler: Arc<dyn JobHandler<P>>) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let running_jobs: RunningJobs = Arc::new(RwLock::new(HashMap::new()));
        let shutdown = CancellationToken::new();

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    receiver.clone(),
                    handler.clone(),
                    running_jobs.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();

        info!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity.max(1),
            "worker pool started"
        );

        Self {
            sender,
            running_jobs,
            shutdown,
            workers: Mutex::new(workers),
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Queue a job without waiting for capacity.
    ///
    /// Returns `QueueFull` when every worker is busy and the queue is at
    /// capacity, `Cancelled` once the pool is shutting down.
    pub async fn submit(&self, job_id: Uuid, payload: P) -> ScrapeResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let token = self.shutdown.child_token();
        self.running_jobs.write().await.insert(job_id, token);

        match self.sender.try_send(QueuedJob { job_id, payload }) {
            Ok(()) => {
                debug!(job_id = %job_id, "job queued");
                Ok(())
            }
            Err(e) => {
                self.running_jobs.write().await.remove(&job_id);
                match e {
                    mpsc::error::TrySendError::Full(_) => {
                        warn!(job_id = %job_id, "job queue is full");
                        Err(ScrapeError::QueueFull)
                    }
                    mpsc::error::TrySendError::Closed(_) => Err(ScrapeError::Cancelled),
                }
            }
        }
    }

    /// Request cancellation of a queued or running job.
    ///
    /// Returns false when the pool does not know the job (finished or never
    /// submitted).
    pub async fn cancel(&self, job_id: Uuid) -> bool {
        match self.running_jobs.read().await.get(&job_id) {
            Some(token) => {
                info!(job_id = %job_id, "cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of jobs queued or running.
    pub async fn active_jobs(&self) -> usize {
        self.running_jobs.read().await.len()
    }

    /// Cancel all jobs and wait for workers to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let handles: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        let count = handles.len();
        let joined = tokio::time::timeout(self.shutdown_timeout, async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!(error = %e, "worker task panicked");
                }
            }
        })
        .await;

        if joined.is_err() {
            warn!(
                timeout_secs = self.shutdown_timeout.as_secs(),
                "workers did not stop before shutdown timeout"
            );
        }
        info!(workers = count, "worker pool stopped");
    }
}

async fn worker_loop<P: Send + 'static>(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob<P>>>>,
    handler: Arc<dyn JobHandler<P>>,
    running_jobs: RunningJobs,
    shutdown: CancellationToken,
) {
    debug!(worker, "worker started");

    loop {
        let next = {
            let mut rx = receiver.lock().await;
            if shutdown.is_cancelled() {
                // Drain whatever is left so queued jobs get finalized.
                rx.try_recv().ok()
            } else {
                let received = tokio::select! {
                    _ = shutdown.cancelled() => None,
                    job = rx.recv() => Some(job),
                };
                match received {
                    Some(job) => job,
                    None => rx.try_recv().ok(),
                }
            }
        };

        let Some(job) = next else { break };
        let job_id = job.job_id;

        let cancel = running_jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .unwrap_or_else(|| shutdown.child_token());

        debug!(worker, job_id = %job_id, "job picked up");
        if let Err(e) = handler.execute(job_id, job.payload, cancel).await {
            error!(worker, job_id = %job_id, error = %e, "job handler failed");
        }

        running_jobs.write().await.remove(&job_id);
    }

    debug!(worker, "worker stopped");
}
