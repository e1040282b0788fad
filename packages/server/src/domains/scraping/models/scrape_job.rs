//! Scrape job model with lifecycle transitions.
//!
//! Transitions are guarded in SQL (`WHERE status = <expected>`), so a stale
//! or repeated transition updates nothing and reports `false`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::{ScrapeError, ScrapeResult};

pub type ScrapeJobId = Uuid;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "scrape_job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// pending -> running -> {completed, failed}; pending -> failed for
    /// jobs that never reached a worker.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ScrapeJob
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, TypedBuilder)]
pub struct ScrapeJob {
    #[builder(default = Uuid::new_v4())]
    pub id: ScrapeJobId,
    #[builder(setter(into))]
    pub name: String,
    #[builder(default, setter(into))]
    pub description: String,
    #[builder(default)]
    pub status: JobStatus,
    #[builder(default = 0)]
    pub records_processed: i64,
    #[builder(default, setter(strip_option))]
    pub error_message: Option<String>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default, setter(strip_option))]
    pub started_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScrapeJob {
    /// Persist a new pending job.
    pub async fn insert(&self, pool: &PgPool) -> ScrapeResult<Self> {
        let job = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO scrape_jobs (id, name, description, status, records_processed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.status)
        .bind(self.records_processed)
        .bind(self.created_at)
        .fetch_one(pool)
        .await?;

        tracing::info!(job_id = %job.id, name = %job.name, "Created scrape job");
        Ok(job)
    }

    /// Create and persist a pending job.
    pub async fn create(
        pool: &PgPool,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ScrapeResult<Self> {
        Self::builder()
            .name(name)
            .description(description)
            .build()
            .insert(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: ScrapeJobId) -> ScrapeResult<Self> {
        sqlx::query_as::<_, Self>("SELECT * FROM scrape_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ScrapeError::NotFound(id))
    }

    /// Most recent jobs first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> ScrapeResult<Vec<Self>> {
        let jobs = sqlx::query_as::<_, Self>(
            "SELECT * FROM scrape_jobs ORDER BY created_at DESC, id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }

    /// pending -> running. Sets `started_at`.
    pub async fn mark_running(pool: &PgPool, id: ScrapeJobId) -> ScrapeResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_jobs
            SET status = 'running', started_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Add to the running counter. Only running jobs are counted.
    pub async fn add_processed(pool: &PgPool, id: ScrapeJobId, rows: u64) -> ScrapeResult<()> {
        let rows = i64::try_from(rows).unwrap_or(i64::MAX);
        sqlx::query(
            r#"
            UPDATE scrape_jobs
            SET records_processed = records_processed + $2
            WHERE id = $1 AND status = 'running'
            "#,
        )
        .bind(id)
        .bind(rows)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// running -> completed.
    pub async fn mark_completed(pool: &PgPool, id: ScrapeJobId) -> ScrapeResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_jobs
            SET status = 'completed', completed_at = NOW()
            WHERE id = $1 AND status = 'running'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// {pending, running} -> failed.
    ///
    /// Pending is accepted for jobs rejected or cancelled before a worker
    /// picked them up; `started_at` stays NULL for those.
    pub async fn mark_failed(pool: &PgPool, id: ScrapeJobId, error: &str) -> ScrapeResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_jobs
            SET status = 'failed', completed_at = NOW(), error_message = $2
            WHERE id = $1 AND status IN ('pending', 'running')
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Fail jobs left pending or running by a previous process.
    pub async fn fail_interrupted(pool: &PgPool) -> ScrapeResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE scrape_jobs
            SET status = 'failed', completed_at = NOW(), error_message = 'interrupted by restart'
            WHERE status IN ('pending', 'running')
            "#,
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
