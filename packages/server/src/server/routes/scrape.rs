//! Scrape trigger and job tracking endpoints.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::scraping::jobs::{cancel_scrape, enqueue_scrape, ScrapeSportsJob};
use crate::domains::scraping::models::{JobStatus, ScrapeJob};
use crate::domains::scraping::{Sport, TargetMode};
use crate::server::app::AppState;
use crate::server::error::ApiError;

const DEFAULT_JOB_LIMIT: i64 = 20;
const MAX_JOB_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequestBody {
    pub season: Option<String>,
    pub target: Option<TargetMode>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Jobs are accepted for running; progress is read from the job endpoints.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: JobStatus,
    pub records_processed: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl From<ScrapeJob> for JobResponse {
    fn from(job: ScrapeJob) -> Self {
        Self {
            job_id: job.id,
            name: job.name,
            description: job.description,
            status: job.status,
            records_processed: job.records_processed,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            error_message: job.error_message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    pub limit: Option<i64>,
}

/// Seasons look like `2023` or `2023-24`.
pub(crate) fn validate_season(season: &str) -> Result<(), ApiError> {
    let valid = !season.is_empty()
        && season.len() <= 9
        && season.starts_with(|c: char| c.is_ascii_digit())
        && season.chars().all(|c| c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid season: {}", season)))
    }
}

/// A body-less request means defaults. A body that is present must parse.
pub(crate) fn request_body(
    body: Result<Json<ScrapeRequestBody>, JsonRejection>,
) -> Result<ScrapeRequestBody, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(ScrapeRequestBody::default()),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

pub(crate) fn parse_sport(raw: &str) -> Result<Sport, ApiError> {
    raw.parse::<Sport>().map_err(ApiError::BadRequest)
}

async fn trigger(
    state: &AppState,
    sports: Vec<Sport>,
    body: ScrapeRequestBody,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let season = body
        .season
        .unwrap_or_else(|| state.server_deps.default_season.clone());
    validate_season(&season)?;

    let job = ScrapeSportsJob::new(sports, season, body.target.unwrap_or_default());
    let record = enqueue_scrape(
        &state.server_deps,
        &state.worker_pool,
        job,
        body.name,
        body.description,
    )
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            job_id: record.id,
            status: JobStatus::Running,
        }),
    ))
}

/// POST /api/scrape/run - scrape every sport
pub async fn run_all_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<ScrapeRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let body = request_body(body)?;
    trigger(&state, Sport::ALL.to_vec(), body).await
}

/// POST /api/scrape/ncaa/:sport - scrape one sport
pub async fn run_sport_handler(
    Extension(state): Extension<AppState>,
    Path(sport): Path<String>,
    body: Result<Json<ScrapeRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let sport = parse_sport(&sport)?;
    let body = request_body(body)?;
    trigger(&state, vec![sport], body).await
}

/// GET /api/scrape/jobs
pub async fn list_jobs_handler(
    Extension(state): Extension<AppState>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_JOB_LIMIT)
        .clamp(1, MAX_JOB_LIMIT);
    let jobs = ScrapeJob::list_recent(&state.db_pool, limit).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

/// GET /api/scrape/jobs/:id
pub async fn get_job_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = ScrapeJob::find_by_id(&state.db_pool, id).await?;
    Ok(Json(job.into()))
}

/// POST /api/scrape/jobs/:id/cancel
pub async fn cancel_job_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = cancel_scrape(&state.server_deps, &state.worker_pool, id).await?;
    Ok(Json(job.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header::CONTENT_TYPE, Method, Request};

    async fn extract_body(
        content_type: Option<&str>,
        body: &str,
    ) -> Result<ScrapeRequestBody, ApiError> {
        let mut request = Request::builder()
            .method(Method::POST)
            .uri("/api/scrape/run");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body.to_owned())).unwrap();
        request_body(Json::<ScrapeRequestBody>::from_request(request, &()).await)
    }

    #[test]
    fn test_validate_season() {
        assert!(validate_season("2023").is_ok());
        assert!(validate_season("2023-24").is_ok());
        assert!(validate_season("").is_err());
        assert!(validate_season("2023; DROP").is_err());
        assert!(validate_season("-2023").is_err());
        assert!(validate_season("2023-2024-25").is_err());
    }

    #[test]
    fn test_parse_sport() {
        assert_eq!(parse_sport("basketball").unwrap(), Sport::Basketball);
        assert!(matches!(parse_sport("curling"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_request_body_target() {
        let body: ScrapeRequestBody =
            serde_json::from_str(r#"{"season": "2022", "target": "generic"}"#).unwrap();
        assert_eq!(body.target, Some(TargetMode::Generic));
        assert!(body.name.is_none());
    }

    #[tokio::test]
    async fn test_request_body_without_content_type_uses_defaults() {
        let body = extract_body(None, "").await.unwrap();
        assert!(body.season.is_none());
        assert!(body.target.is_none());
    }

    #[tokio::test]
    async fn test_request_body_rejects_malformed_json() {
        let unknown_target = extract_body(Some("application/json"), r#"{"target": "xml"}"#).await;
        assert!(matches!(unknown_target, Err(ApiError::BadRequest(_))));

        let truncated = extract_body(Some("application/json"), r#"{"season": "#).await;
        assert!(matches!(truncated, Err(ApiError::BadRequest(_))));

        let wrong_type = extract_body(Some("application/json"), r#"{"season": 2023}"#).await;
        assert!(matches!(wrong_type, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_request_body_parses_json() {
        let body = extract_body(Some("application/json"), r#"{"season": "2021-22"}"#)
            .await
            .unwrap();
        assert_eq!(body.season.as_deref(), Some("2021-22"));
    }
}
