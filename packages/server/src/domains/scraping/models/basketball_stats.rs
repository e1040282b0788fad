use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::ScrapeResult;

/// One player-season row in `basketball_stats`. NULL means unknown.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BasketballStats {
    pub id: i64,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub season: String,
    pub games_played: Option<i32>,
    pub points_per_game: Option<f64>,
    pub field_goal_percentage: Option<f64>,
    pub three_point_percentage: Option<f64>,
    pub free_throw_percentage: Option<f64>,
    pub rebounds_per_game: Option<f64>,
    pub assists_per_game: Option<f64>,
    pub steals_per_game: Option<f64>,
    pub blocks_per_game: Option<f64>,
    pub turnovers_per_game: Option<f64>,
    pub minutes_per_game: Option<f64>,
    pub is_demo_data: bool,
    pub created_at: DateTime<Utc>,
}

impl BasketballStats {
    /// Rows for a season (or all seasons), best scorers first.
    pub async fn find(pool: &PgPool, season: Option<&str>, limit: i64) -> ScrapeResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM basketball_stats
            WHERE ($1::TEXT IS NULL OR season = $1)
            ORDER BY points_per_game DESC NULLS LAST, id
            LIMIT $2
            "#,
        )
        .bind(season)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(pool: &PgPool, season: &str, demo: bool) -> ScrapeResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM basketball_stats WHERE season = $1 AND is_demo_data = $2",
        )
        .bind(season)
        .bind(demo)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
