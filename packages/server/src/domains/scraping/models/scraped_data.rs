use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool};

use crate::common::{NormalizedTable, ScrapeResult};

pub const SOURCE_NCAA: &str = "ncaa";

/// Archived copy of one normalized category table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScrapedData {
    pub id: i64,
    pub source_url: String,
    pub data_type: String,
    pub category: String,
    pub season: String,
    pub source: String,
    pub processed_data: serde_json::Value,
    pub checksum: String,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Hex SHA-256 of the serialized payload.
pub fn checksum(payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

impl ScrapedData {
    /// Archive a table. Returns false when an identical payload is already
    /// stored.
    pub async fn archive(
        pool: &PgPool,
        source_url: &str,
        data_type: &str,
        category: &str,
        season: &str,
        table: &NormalizedTable,
    ) -> ScrapeResult<bool> {
        let payload = serde_json::json!({
            "source_url": source_url,
            "season": season,
            "columns": table.columns(),
            "records": table.to_json_records(),
        });
        let checksum = checksum(&payload);

        let result = sqlx::query(
            r#"
            INSERT INTO scraped_data (
                source_url, data_type, category, season, source,
                processed_data, checksum, scraped_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (checksum) DO NOTHING
            "#,
        )
        .bind(source_url)
        .bind(data_type)
        .bind(category)
        .bind(season)
        .bind(SOURCE_NCAA)
        .bind(&payload)
        .bind(&checksum)
        .execute(pool)
        .await?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            tracing::debug!(source_url = %source_url, checksum = %checksum, "Identical payload already archived");
        }
        Ok(inserted)
    }

    pub async fn find_by_type(pool: &PgPool, data_type: &str, season: &str) -> ScrapeResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM scraped_data
            WHERE data_type = $1 AND season = $2
            ORDER BY scraped_at DESC, id
            "#,
        )
        .bind(data_type)
        .bind(season)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}
