use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::ScrapeResult;

/// One player-season row in `football_stats`. NULL means unknown.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FootballStats {
    pub id: i64,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub season: String,
    pub games_played: Option<i32>,
    pub passing_yards: Option<i32>,
    pub passing_touchdowns: Option<i32>,
    pub interceptions_thrown: Option<i32>,
    pub rushing_yards: Option<i32>,
    pub rushing_touchdowns: Option<i32>,
    pub receiving_yards: Option<i32>,
    pub receiving_touchdowns: Option<i32>,
    pub total_tackles: Option<i32>,
    pub sacks: Option<f64>,
    pub interceptions: Option<i32>,
    pub fumbles_recovered: Option<i32>,
    pub is_demo_data: bool,
    pub created_at: DateTime<Utc>,
}

impl FootballStats {
    pub async fn find(pool: &PgPool, season: Option<&str>, limit: i64) -> ScrapeResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM football_stats
            WHERE ($1::TEXT IS NULL OR season = $1)
            ORDER BY player_name NULLS LAST, id
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
            "SELECT COUNT(*) FROM football_stats WHERE season = $1 AND is_demo_data = $2",
        )
        .bind(season)
        .bind(demo)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
