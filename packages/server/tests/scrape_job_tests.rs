//! Integration tests for scrape job execution and lifecycle.
//!
//! Extraction runs against `MockExtractor`s; everything from orchestration
//! down to Postgres is real.

mod common;

use std::sync::Arc;
use std::time::Duration;

use crate::common::TestHarness;
use sportsbot_core::common::ScrapeError;
use sportsbot_core::domains::scraping::jobs::{
    cancel_scrape, enqueue_scrape, execute_scrape, start_worker_pool, ScrapeSportsJob,
};
use sportsbot_core::domains::scraping::models::{
    BasketballStats, JobStatus, ScrapeJob, ScrapedData,
};
use sportsbot_core::domains::scraping::{Sport, TargetMode};
use sportsbot_core::kernel::test_dependencies::{basketball_rows, positional_rows};
use sportsbot_core::kernel::{MockExtractor, MockResponse, PoolConfig};
use test_context::test_context;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const SCORING: &str = "basketball-men/d1/scoring";
const REBOUNDING: &str = "basketball-men/d1/rebounding";
const ASSISTS: &str = "basketball-men/d1/assists";

// =============================================================================
// Test Helpers
// =============================================================================

fn basketball_job(ctx: &TestHarness) -> ScrapeSportsJob {
    ScrapeSportsJob::new(vec![Sport::Basketball], ctx.season.clone(), TargetMode::Typed)
}

async fn create_job(ctx: &TestHarness) -> ScrapeJob {
    ScrapeJob::create(&ctx.db_pool, "test scrape", "")
        .await
        .expect("Failed to create job")
}

/// Poll until the job reaches `status`.
async fn wait_for_status(ctx: &TestHarness, id: Uuid, status: JobStatus) -> ScrapeJob {
    for _ in 0..100 {
        let job = ScrapeJob::find_by_id(&ctx.db_pool, id).await.unwrap();
        if job.status == status {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("job {} never reached {}", id, status);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn guarded_transitions_ignore_stale_updates(ctx: &TestHarness) {
    let job = ScrapeJob::create(&ctx.db_pool, "guarded", "desc").await.unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.records_processed, 0);

    // Not running yet
    assert!(!ScrapeJob::mark_completed(&ctx.db_pool, job.id).await.unwrap());
    ScrapeJob::add_processed(&ctx.db_pool, job.id, 5).await.unwrap();

    assert!(ScrapeJob::mark_running(&ctx.db_pool, job.id).await.unwrap());
    assert!(!ScrapeJob::mark_running(&ctx.db_pool, job.id).await.unwrap());
    ScrapeJob::add_processed(&ctx.db_pool, job.id, 7).await.unwrap();
    assert!(ScrapeJob::mark_completed(&ctx.db_pool, job.id).await.unwrap());

    // Terminal
    assert!(!ScrapeJob::mark_failed(&ctx.db_pool, job.id, "late").await.unwrap());
    ScrapeJob::add_processed(&ctx.db_pool, job.id, 100).await.unwrap();

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.records_processed, 7);
    assert!(stored.error_message.is_none());
}

// =============================================================================
// Execution
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn job_completes_and_counts_rows_across_categories(ctx: &TestHarness) {
    let static_extractor = Arc::new(
        MockExtractor::new("static")
            .with_rows(SCORING, basketball_rows(12))
            .with_rows(REBOUNDING, basketball_rows(3))
            .with_response(ASSISTS, MockResponse::NetworkError("connection reset".into())),
    );
    let dynamic_extractor =
        Arc::new(MockExtractor::new("dynamic").with_rows(REBOUNDING, basketball_rows(8)));
    let deps = ctx.deps_with(static_extractor.clone(), dynamic_extractor.clone());

    let job = create_job(ctx).await;
    let written = execute_scrape(&deps, job.id, &basketball_job(ctx), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(written, 20);

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.records_processed, 20);
    assert!(stored.started_at.is_some());
    assert!(stored.completed_at.is_some());
    assert!(stored.error_message.is_none());

    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, false).await.unwrap(),
        20
    );

    // Thin static result escalated, healthy one did not, failed one was skipped
    assert!(dynamic_extractor.was_called_with(REBOUNDING));
    assert!(!dynamic_extractor.was_called_with(SCORING));
    assert!(!dynamic_extractor.was_called_with(ASSISTS));
    assert_eq!(static_extractor.call_count(), 5);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn job_completes_when_every_category_fails(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_fallback(MockResponse::Rows(Vec::new())),
        MockExtractor::new("dynamic")
            .with_fallback(MockResponse::BrowserError("chromium crashed".into())),
    );

    let job = create_job(ctx).await;
    let written = execute_scrape(&deps, job.id, &basketball_job(ctx), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(written, 0);
    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.records_processed, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn identical_tables_are_archived_once_but_loaded_every_run(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_rows(SCORING, basketball_rows(6)),
        MockExtractor::new("dynamic"),
    );
    let payload = basketball_job(ctx);

    for _ in 0..2 {
        let job = create_job(ctx).await;
        execute_scrape(&deps, job.id, &payload, &CancellationToken::new())
            .await
            .unwrap();
    }

    let archived = ScrapedData::find_by_type(&ctx.db_pool, "basketball", &ctx.season)
        .await
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].category, "scoring");
    assert_eq!(archived[0].source, "ncaa");
    assert!(archived[0].source_url.ends_with(&format!("{}/{}", SCORING, ctx.season)));

    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, false).await.unwrap(),
        12
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn generic_target_keeps_positional_columns(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_rows(SCORING, positional_rows(7)),
        MockExtractor::new("dynamic"),
    );
    let payload =
        ScrapeSportsJob::new(vec![Sport::Basketball], ctx.season.clone(), TargetMode::Generic);

    let job = create_job(ctx).await;
    let written = execute_scrape(&deps, job.id, &payload, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(written, 7);

    let table_name = format!("ncaa_basketball_scoring_{}", ctx.season.replace('-', "_"));
    let first: Option<String> = sqlx::query_scalar(&format!(
        "SELECT row_data->>'column_1' FROM {} ORDER BY id LIMIT 1",
        table_name
    ))
    .fetch_one(&ctx.db_pool)
    .await
    .unwrap();
    assert_eq!(first.as_deref(), Some("Player 0"));

    // Typed tables are untouched
    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, false).await.unwrap(),
        0
    );
}

// =============================================================================
// Persistence failures
// =============================================================================

/// Make Postgres reject moving `job_id` into `status`.
///
/// Returns the trigger name for `allow_transition`.
async fn reject_transition(ctx: &TestHarness, job_id: Uuid, status: JobStatus) -> String {
    let name = format!("reject_{}", job_id.simple());
    sqlx::query(&format!(
        "CREATE FUNCTION {name}() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'transition to % rejected', NEW.status; END \
         $$ LANGUAGE plpgsql"
    ))
    .execute(&ctx.db_pool)
    .await
    .unwrap();
    sqlx::query(&format!(
        "CREATE TRIGGER {name} BEFORE UPDATE ON scrape_jobs FOR EACH ROW \
         WHEN (NEW.id = '{job_id}' AND NEW.status = '{status}') \
         EXECUTE FUNCTION {name}()"
    ))
    .execute(&ctx.db_pool)
    .await
    .unwrap();
    name
}

async fn allow_transition(ctx: &TestHarness, name: &str) {
    sqlx::query(&format!("DROP TRIGGER {name} ON scrape_jobs"))
        .execute(&ctx.db_pool)
        .await
        .unwrap();
    sqlx::query(&format!("DROP FUNCTION {name}()"))
        .execute(&ctx.db_pool)
        .await
        .unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn overlong_season_fails_job_with_persistence_error(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_rows(SCORING, basketball_rows(6)),
        MockExtractor::new("dynamic"),
    );
    // Longer than the season column allows; the HTTP layer would reject it
    let payload = ScrapeSportsJob::new(vec![Sport::Basketball], "2023-2024-25", TargetMode::Typed);

    let job = create_job(ctx).await;
    let result = execute_scrape(&deps, job.id, &payload, &CancellationToken::new()).await;
    assert!(matches!(result, Err(ScrapeError::Persistence(_))));

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.completed_at.is_some());
    let message = stored.error_message.expect("failure reason recorded");
    assert!(message.starts_with("Persistence error"), "{}", message);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejected_start_fails_job_without_scraping(ctx: &TestHarness) {
    let static_extractor = Arc::new(MockExtractor::new("static"));
    let deps = ctx.deps_with(static_extractor.clone(), Arc::new(MockExtractor::new("dynamic")));
    let job = create_job(ctx).await;
    let trigger = reject_transition(ctx, job.id, JobStatus::Running).await;

    let result = execute_scrape(&deps, job.id, &basketball_job(ctx), &CancellationToken::new()).await;
    allow_transition(ctx, &trigger).await;

    assert!(matches!(result, Err(ScrapeError::Persistence(_))));
    assert_eq!(static_extractor.call_count(), 0);

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.started_at.is_none());
    let message = stored.error_message.expect("failure reason recorded");
    assert!(message.contains("transition to running rejected"), "{}", message);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn rejected_completion_fails_job_after_loading(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_rows(SCORING, basketball_rows(6)),
        MockExtractor::new("dynamic"),
    );
    let job = create_job(ctx).await;
    let trigger = reject_transition(ctx, job.id, JobStatus::Completed).await;

    let result = execute_scrape(&deps, job.id, &basketball_job(ctx), &CancellationToken::new()).await;
    allow_transition(ctx, &trigger).await;

    assert!(matches!(result, Err(ScrapeError::Persistence(_))));

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.records_processed, 6);
    let message = stored.error_message.expect("failure reason recorded");
    assert!(message.contains("transition to completed rejected"), "{}", message);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn cancelling_running_job_marks_it_failed(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_fallback(MockResponse::WaitForCancel),
        MockExtractor::new("dynamic"),
    );
    let job = create_job(ctx).await;
    let cancel = CancellationToken::new();

    let handle = {
        let deps = deps.clone();
        let payload = basketball_job(ctx);
        let cancel = cancel.clone();
        let id = job.id;
        tokio::spawn(async move { execute_scrape(&deps, id, &payload, &cancel).await })
    };

    wait_for_status(ctx, job.id, JobStatus::Running).await;
    cancel.cancel();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(ScrapeError::Cancelled)));

    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.error_message.as_deref(), Some("cancelled"));
    assert!(stored.completed_at.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn job_cancelled_before_start_never_runs(ctx: &TestHarness) {
    let static_extractor = Arc::new(MockExtractor::new("static"));
    let deps = ctx.deps_with(static_extractor.clone(), Arc::new(MockExtractor::new("dynamic")));
    let job = create_job(ctx).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = execute_scrape(&deps, job.id, &basketball_job(ctx), &cancel).await;

    assert!(matches!(result, Err(ScrapeError::Cancelled)));
    assert_eq!(static_extractor.call_count(), 0);
    let stored = ScrapeJob::find_by_id(&ctx.db_pool, job.id).await.unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.started_at.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancel_through_pool_stops_queued_job(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_fallback(MockResponse::WaitForCancel),
        MockExtractor::new("dynamic"),
    );
    let pool = start_worker_pool(deps.clone(), PoolConfig::default());

    let job = enqueue_scrape(&deps, &pool, basketball_job(ctx), None, None)
        .await
        .unwrap();
    assert_eq!(job.name, format!("NCAA basketball {}", ctx.season));

    wait_for_status(ctx, job.id, JobStatus::Running).await;
    cancel_scrape(&deps, &pool, job.id).await.unwrap();

    let stored = wait_for_status(ctx, job.id, JobStatus::Failed).await;
    assert_eq!(stored.error_message.as_deref(), Some("cancelled"));

    // Terminal jobs are returned unchanged
    let again = cancel_scrape(&deps, &pool, job.id).await.unwrap();
    assert_eq!(again.status, JobStatus::Failed);
    assert_eq!(again.completed_at, stored.completed_at);

    pool.shutdown().await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cancel_of_job_unknown_to_pool_fails_it(ctx: &TestHarness) {
    let deps = ctx.deps(MockExtractor::new("static"), MockExtractor::new("dynamic"));
    let pool = start_worker_pool(deps.clone(), PoolConfig::default());
    let job = create_job(ctx).await;

    let cancelled = cancel_scrape(&deps, &pool, job.id).await.unwrap();

    assert_eq!(cancelled.status, JobStatus::Failed);
    assert_eq!(cancelled.error_message.as_deref(), Some("cancelled"));

    let missing = cancel_scrape(&deps, &pool, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(ScrapeError::NotFound(_))));

    pool.shutdown().await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn full_queue_rejects_and_fails_job(ctx: &TestHarness) {
    let deps = ctx.deps(
        MockExtractor::new("static").with_fallback(MockResponse::WaitForCancel),
        MockExtractor::new("dynamic"),
    );
    let pool = start_worker_pool(
        deps.clone(),
        PoolConfig {
            workers: 1,
            queue_capacity: 1,
            shutdown_timeout: Duration::from_secs(5),
        },
    );

    let running = enqueue_scrape(&deps, &pool, basketball_job(ctx), None, None)
        .await
        .unwrap();
    wait_for_status(ctx, running.id, JobStatus::Running).await;

    let queued = enqueue_scrape(&deps, &pool, basketball_job(ctx), Some("queued".into()), None)
        .await
        .unwrap();
    assert_eq!(queued.status, JobStatus::Pending);

    let rejected = enqueue_scrape(&deps, &pool, basketball_job(ctx), Some("rejected".into()), None)
        .await;
    assert!(matches!(rejected, Err(ScrapeError::QueueFull)));

    let jobs = ScrapeJob::list_recent(&ctx.db_pool, 100).await.unwrap();
    let rejected = jobs
        .iter()
        .find(|j| j.name == "rejected")
        .expect("rejected job was recorded");
    assert_eq!(rejected.status, JobStatus::Failed);
    assert_eq!(rejected.error_message.as_deref(), Some("scrape queue is full"));

    pool.shutdown().await;

    let running = ScrapeJob::find_by_id(&ctx.db_pool, running.id).await.unwrap();
    let queued = ScrapeJob::find_by_id(&ctx.db_pool, queued.id).await.unwrap();
    assert_eq!(running.status, JobStatus::Failed);
    assert_eq!(queued.status, JobStatus::Failed);
}
