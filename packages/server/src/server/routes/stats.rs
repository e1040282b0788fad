//! Read access to stored stat records for downstream consumers.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::scraping::models::{BasketballStats, FootballStats};
use crate::domains::scraping::Sport;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::routes::scrape::{parse_sport, validate_season};

const DEFAULT_STATS_LIMIT: i64 = 100;
const MAX_STATS_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub season: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub sport: Sport,
    pub season: Option<String>,
    pub count: usize,
    pub records: serde_json::Value,
}

/// GET /api/stats/:sport?season=&limit=
pub async fn list_stats_handler(
    Extension(state): Extension<AppState>,
    Path(sport): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let sport = parse_sport(&sport)?;
    if let Some(season) = &params.season {
        validate_season(season)?;
    }
    let limit = params
        .limit
        .unwrap_or(DEFAULT_STATS_LIMIT)
        .clamp(1, MAX_STATS_LIMIT);
    let season = params.season.as_deref();

    let (count, records) = match sport {
        Sport::Basketball => {
            let rows = BasketballStats::find(&state.db_pool, season, limit).await?;
            (rows.len(), serde_json::to_value(rows))
        }
        Sport::Football => {
            let rows = FootballStats::find(&state.db_pool, season, limit).await?;
            (rows.len(), serde_json::to_value(rows))
        }
    };
    let records = records.map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(StatsResponse {
        sport,
        season: params.season,
        count,
        records,
    }))
}
