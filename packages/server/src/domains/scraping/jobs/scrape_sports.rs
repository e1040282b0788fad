//! ScrapeSportsJob - background scrape of one or more sports for a season.
//!
//! The HTTP trigger creates a pending `ScrapeJob`, queues this payload on the
//! worker pool and returns immediately with the job id.
//!
//! ```text
//! worker ──► mark_running
//!              └─► per sport: orchestrate categories
//!                     └─► per non-empty table: archive ─► load ─► add_processed
//!        ──► mark_completed | mark_failed(error)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::common::{ScrapeError, ScrapeResult};
use crate::domains::scraping::categories::Sport;
use crate::domains::scraping::loader::{self, LoadTarget, TargetMode};
use crate::domains::scraping::models::{ScrapeJob, ScrapedData};
use crate::domains::scraping::normalize::NullPolicy;
use crate::domains::scraping::orchestrator::CategoryOrchestrator;
use crate::kernel::{JobHandler, PoolConfig, ServerDeps, WorkerPool};

/// Payload queued for a scrape job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSportsJob {
    pub sports: Vec<Sport>,
    pub season: String,
    #[serde(default)]
    pub target: TargetMode,
}

impl ScrapeSportsJob {
    /// The job type identifier used in logs.
    pub const JOB_TYPE: &'static str = "scrape_sports";

    pub fn new(sports: Vec<Sport>, season: impl Into<String>, target: TargetMode) -> Self {
        Self {
            sports,
            season: season.into(),
            target,
        }
    }

    /// Every supported sport.
    pub fn all(season: impl Into<String>, target: TargetMode) -> Self {
        Self::new(Sport::ALL.to_vec(), season, target)
    }

    /// Default job name, e.g. `NCAA basketball, football 2023`.
    pub fn default_name(&self) -> String {
        let sports: Vec<&str> = self.sports.iter().map(Sport::as_str).collect();
        format!("NCAA {} {}", sports.join(", "), self.season)
    }

    fn null_policy(&self) -> NullPolicy {
        match self.target {
            TargetMode::Typed => NullPolicy::KeepNull,
            TargetMode::Generic => NullPolicy::EmptyMarker,
        }
    }
}

pub type ScrapeWorkerPool = WorkerPool<ScrapeSportsJob>;

/// Start the worker pool that executes scrape jobs.
pub fn start_worker_pool(deps: ServerDeps, config: PoolConfig) -> ScrapeWorkerPool {
    WorkerPool::start(config, Arc::new(ScrapeJobHandler::new(deps)))
}

// =============================================================================
// Trigger / cancel
// =============================================================================

/// Create a pending job and queue it.
///
/// A rejected submission leaves the job `failed` with the rejection reason.
pub async fn enqueue_scrape(
    deps: &ServerDeps,
    pool: &ScrapeWorkerPool,
    job: ScrapeSportsJob,
    name: Option<String>,
    description: Option<String>,
) -> ScrapeResult<ScrapeJob> {
    let name = name.unwrap_or_else(|| job.default_name());
    let record = ScrapeJob::create(&deps.db_pool, name, description.unwrap_or_default()).await?;

    if let Err(e) = pool.submit(record.id, job).await {
        ScrapeJob::mark_failed(&deps.db_pool, record.id, &e.to_string()).await?;
        return Err(e);
    }

    info!(job_id = %record.id, job_type = ScrapeSportsJob::JOB_TYPE, "Scrape job queued");
    Ok(record)
}

/// Request cancellation of a job. Terminal jobs are returned unchanged.
pub async fn cancel_scrape(
    deps: &ServerDeps,
    pool: &ScrapeWorkerPool,
    job_id: Uuid,
) -> ScrapeResult<ScrapeJob> {
    let job = ScrapeJob::find_by_id(&deps.db_pool, job_id).await?;
    if job.status.is_terminal() {
        return Ok(job);
    }

    if !pool.cancel(job_id).await {
        // Not owned by this process (e.g. left over from a previous run).
        ScrapeJob::mark_failed(&deps.db_pool, job_id, &ScrapeError::Cancelled.to_string()).await?;
    }

    ScrapeJob::find_by_id(&deps.db_pool, job_id).await
}

// =============================================================================
// Execution
// =============================================================================

pub struct ScrapeJobHandler {
    deps: ServerDeps,
}

impl ScrapeJobHandler {
    pub fn new(deps: ServerDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl JobHandler<ScrapeSportsJob> for ScrapeJobHandler {
    async fn execute(
        &self,
        job_id: Uuid,
        payload: ScrapeSportsJob,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        match execute_scrape(&self.deps, job_id, &payload, &cancel).await {
            Ok(_) | Err(ScrapeError::Cancelled) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Run a queued job to a terminal state. Returns rows written.
pub async fn execute_scrape(
    deps: &ServerDeps,
    job_id: Uuid,
    job: &ScrapeSportsJob,
    cancel: &CancellationToken,
) -> ScrapeResult<u64> {
    let pool = &deps.db_pool;

    if cancel.is_cancelled() {
        finalize_failed(deps, job_id, &ScrapeError::Cancelled).await;
        return Err(ScrapeError::Cancelled);
    }

    match ScrapeJob::mark_running(pool, job_id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(job_id = %job_id, "Job is no longer pending, skipping");
            return Ok(0);
        }
        Err(e) => {
            finalize_failed(deps, job_id, &e).await;
            return Err(e);
        }
    }
    info!(job_id = %job_id, sports = ?job.sports, season = %job.season, "Scrape job running");

    let result = match run_sports(deps, job_id, job, cancel).await {
        Ok(total) => ScrapeJob::mark_completed(pool, job_id).await.map(|_| total),
        Err(e) => Err(e),
    };

    match result {
        Ok(total) => {
            info!(job_id = %job_id, records = total, "Scrape job completed");
            Ok(total)
        }
        Err(e) => {
            finalize_failed(deps, job_id, &e).await;
            Err(e)
        }
    }
}

async fn finalize_failed(deps: &ServerDeps, job_id: Uuid, cause: &ScrapeError) {
    warn!(job_id = %job_id, error = %cause, "Scrape job failed");
    if let Err(e) = ScrapeJob::mark_failed(&deps.db_pool, job_id, &cause.to_string()).await {
        error!(job_id = %job_id, error = %e, "Failed to mark scrape job as failed");
    }
}

async fn run_sports(
    deps: &ServerDeps,
    job_id: Uuid,
    job: &ScrapeSportsJob,
    cancel: &CancellationToken,
) -> ScrapeResult<u64> {
    let orchestrator = CategoryOrchestrator::from_deps(deps).with_null_policy(job.null_policy());
    let mut total = 0u64;

    for &sport in &job.sports {
        let tables = orchestrator.run(sport, &job.season, cancel).await?;

        for (category, table) in tables {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }
            if table.is_empty() {
                continue;
            }

            let source_url = category.source_url(&deps.stats_base_url, sport, &job.season);
            ScrapedData::archive(
                &deps.db_pool,
                &source_url,
                sport.as_str(),
                category.slug(),
                &job.season,
                &table,
            )
            .await?;

            let target = match job.target {
                TargetMode::Typed => LoadTarget::for_sport(sport),
                TargetMode::Generic => LoadTarget::Generic(format!("{}_{}", sport, category)),
            };
            let written = loader::load(&deps.db_pool, &table, &target, &job.season).await?;
            ScrapeJob::add_processed(&deps.db_pool, job_id, written).await?;
            total += written;

            info!(
                job_id = %job_id,
                sport = %sport,
                category = %category,
                rows = written,
                "Category loaded"
            );
        }
    }

    Ok(total)
}
