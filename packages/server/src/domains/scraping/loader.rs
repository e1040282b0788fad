//! Append normalized tables to persistent storage.
//!
//! Every write is an INSERT; nothing here updates or deletes rows, so loading
//! the same table twice stores it twice.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::categories::Sport;
use super::schema::{TargetSchema, TypedValue, BASKETBALL_SCHEMA, FOOTBALL_SCHEMA};
use crate::common::{NormalizedTable, ScrapeResult};

/// Keeps each INSERT well under the Postgres bind parameter limit.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Postgres truncates identifiers beyond this length.
const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    BasketballStats,
    FootballStats,
    /// `ncaa_<name>_<season>` with one JSON document per row
    Generic(String),
}

impl LoadTarget {
    pub fn for_sport(sport: Sport) -> Self {
        match sport {
            Sport::Basketball => LoadTarget::BasketballStats,
            Sport::Football => LoadTarget::FootballStats,
        }
    }

    fn schema(&self) -> Option<&'static TargetSchema> {
        match self {
            LoadTarget::BasketballStats => Some(&BASKETBALL_SCHEMA),
            LoadTarget::FootballStats => Some(&FOOTBALL_SCHEMA),
            LoadTarget::Generic(_) => None,
        }
    }
}

/// How a job persists its tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Shared per-sport typed tables
    #[default]
    Typed,
    /// One generic table per sport, category and season
    Generic,
}

/// `ncaa_<name>_<season>` reduced to `[a-z0-9_]`.
pub fn generic_table_name(name: &str, season: &str) -> String {
    let raw = format!("ncaa_{}_{}", name, season).to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = if ch.is_ascii_alphanumeric() { ch } else { '_' };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }
    let trimmed = out.trim_end_matches('_');
    trimmed.chars().take(MAX_IDENTIFIER_LEN).collect()
}

/// Append `table` to `target`, returning the number of rows written.
pub async fn load(
    pool: &PgPool,
    table: &NormalizedTable,
    target: &LoadTarget,
    season: &str,
) -> ScrapeResult<u64> {
    if table.is_empty() {
        debug!(load_target = ?target, "Nothing to load");
        return Ok(0);
    }

    let written = match target.schema() {
        Some(schema) => load_typed(pool, table, schema, season).await?,
        None => {
            let name = match target {
                LoadTarget::Generic(name) => name.as_str(),
                _ => "data",
            };
            load_generic(pool, table, &generic_table_name(name, season), season).await?
        }
    };

    info!(load_target = ?target, season = %season, rows = written, "Rows appended");
    Ok(written)
}

async fn load_typed(
    pool: &PgPool,
    table: &NormalizedTable,
    schema: &TargetSchema,
    season: &str,
) -> ScrapeResult<u64> {
    let rows = schema.project(table);
    let columns = schema.column_names().collect::<Vec<_>>().join(", ");

    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}, season, is_demo_data) ",
            schema.table, columns
        ));
        builder.push_values(chunk, |mut b, row| {
            for value in row {
                match value {
                    TypedValue::Text(v) => b.push_bind(v.clone()),
                    TypedValue::Int(v) => b.push_bind(*v),
                    TypedValue::Float(v) => b.push_bind(*v),
                };
            }
            b.push_bind(season.to_string()).push_bind(false);
        });

        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

async fn load_generic(
    pool: &PgPool,
    table: &NormalizedTable,
    table_name: &str,
    season: &str,
) -> ScrapeResult<u64> {
    let records = table.to_json_records();

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            season TEXT NOT NULL,
            row_data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        table_name
    ))
    .execute(&mut *tx)
    .await?;

    let mut written = 0u64;
    for chunk in records.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (season, row_data) ", table_name));
        builder.push_values(chunk, |mut b, record| {
            b.push_bind(season.to_string()).push_bind(record.clone());
        });
        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}
