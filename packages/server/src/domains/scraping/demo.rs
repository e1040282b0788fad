//! Synthetic demo rows so downstream consumers have data before any scrape.
//!
//! Regeneration deletes only rows flagged `is_demo_data` and never touches
//! scraped rows.

use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::categories::Sport;
use crate::common::ScrapeResult;

pub const DEFAULT_DEMO_PLAYERS: usize = 20;

/// Football rows bind 17 parameters; Postgres allows 65,535 per statement.
const INSERT_CHUNK_ROWS: usize = 1000;

const BASKETBALL_TEAMS: &[&str] = &["Lakers", "Warriors", "Celtics", "Heat", "Bucks", "Suns", "Nets", "76ers"];
const BASKETBALL_FIRST: &[&str] = &[
    "LeBron", "Stephen", "Jayson", "Jimmy", "Giannis", "Chris", "Kevin", "Joel", "Luka", "Damian",
];
const BASKETBALL_LAST: &[&str] = &[
    "James", "Curry", "Tatum", "Butler", "Antetokounmpo", "Paul", "Durant", "Embiid", "Doncic", "Lillard",
];

const FOOTBALL_TEAMS: &[&str] = &["Chiefs", "Eagles", "Cowboys", "Patriots", "Ravens", "Bills", "49ers", "Packers"];
const FOOTBALL_FIRST: &[&str] = &[
    "Patrick", "Jalen", "Dak", "Mac", "Lamar", "Josh", "Brock", "Aaron", "Justin", "Kyler",
];
const FOOTBALL_LAST: &[&str] = &[
    "Mahomes", "Hurts", "Prescott", "Jones", "Jackson", "Allen", "Purdy", "Rodgers", "Herbert", "Murray",
];
const POSITIONS: &[&str] = &["QB", "RB", "WR", "TE", "FB"];

#[derive(Debug, Clone, PartialEq)]
pub struct DemoBasketballRow {
    pub player_name: String,
    pub team_name: String,
    pub games_played: i32,
    pub points_per_game: f64,
    pub field_goal_percentage: f64,
    pub three_point_percentage: f64,
    pub free_throw_percentage: f64,
    pub rebounds_per_game: f64,
    pub assists_per_game: f64,
    pub steals_per_game: f64,
    pub blocks_per_game: f64,
    pub turnovers_per_game: f64,
    pub minutes_per_game: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoFootballRow {
    pub player_name: String,
    pub team_name: String,
    pub position: String,
    pub games_played: i32,
    pub passing_yards: i32,
    pub passing_touchdowns: i32,
    pub interceptions_thrown: i32,
    pub rushing_yards: i32,
    pub rushing_touchdowns: i32,
    pub receiving_yards: i32,
    pub receiving_touchdowns: i32,
    pub total_tackles: i32,
    pub sacks: f64,
    pub interceptions: i32,
    pub fumbles_recovered: i32,
}

/// Rows deleted and inserted per sport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoSummary {
    pub basketball_deleted: u64,
    pub basketball_inserted: u64,
    pub football_deleted: u64,
    pub football_inserted: u64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn pick<'a, R: Rng>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// `"<First> <Last> Demo <n>"`, unique by its 1-based index.
fn demo_name<R: Rng>(rng: &mut R, first: &[&str], last: &[&str], index: usize) -> String {
    format!("{} {} Demo {}", pick(rng, first), pick(rng, last), index + 1)
}

pub fn generate_basketball<R: Rng>(rng: &mut R, count: usize) -> Vec<DemoBasketballRow> {
    (0..count)
        .map(|i| DemoBasketballRow {
            player_name: demo_name(rng, BASKETBALL_FIRST, BASKETBALL_LAST, i),
            team_name: pick(rng, BASKETBALL_TEAMS).to_string(),
            games_played: rng.gen_range(65..=82),
            points_per_game: round_to(rng.gen_range(10.0..30.0), 1),
            field_goal_percentage: round_to(rng.gen_range(0.40..0.55), 3),
            three_point_percentage: round_to(rng.gen_range(0.30..0.45), 3),
            free_throw_percentage: round_to(rng.gen_range(0.70..0.95), 3),
            rebounds_per_game: round_to(rng.gen_range(4.0..12.0), 1),
            assists_per_game: round_to(rng.gen_range(3.0..9.0), 1),
            steals_per_game: round_to(rng.gen_range(0.5..2.5), 1),
            blocks_per_game: round_to(rng.gen_range(0.5..3.0), 1),
            turnovers_per_game: round_to(rng.gen_range(1.0..4.0), 1),
            minutes_per_game: round_to(rng.gen_range(25.0..38.0), 1),
        })
        .collect()
}

pub fn generate_football<R: Rng>(rng: &mut R, count: usize) -> Vec<DemoFootballRow> {
    (0..count)
        .map(|i| {
            let player_name = demo_name(rng, FOOTBALL_FIRST, FOOTBALL_LAST, i);
            let team_name = pick(rng, FOOTBALL_TEAMS).to_string();
            let position = pick(rng, POSITIONS);
            let games_played = rng.gen_range(10..=17);

            let mut row = DemoFootballRow {
                player_name,
                team_name,
                position: position.to_string(),
                games_played,
                passing_yards: 0,
                passing_touchdowns: 0,
                interceptions_thrown: 0,
                rushing_yards: 0,
                rushing_touchdowns: 0,
                receiving_yards: 0,
                receiving_touchdowns: 0,
                total_tackles: 0,
                sacks: 0.0,
                interceptions: 0,
                fumbles_recovered: 0,
            };

            match position {
                "QB" => {
                    row.passing_yards = rng.gen_range(2000..=5000);
                    row.passing_touchdowns = rng.gen_range(20..=45);
                    row.interceptions_thrown = rng.gen_range(5..=15);
                    row.rushing_yards = rng.gen_range(100..=500);
                    row.rushing_touchdowns = rng.gen_range(0..=8);
                    row.total_tackles = rng.gen_range(0..=3);
                    row.sacks = round_to(rng.gen_range(0.0..=2.0), 1);
                    row.interceptions = rng.gen_range(0..=2);
                    row.fumbles_recovered = rng.gen_range(0..=2);
                }
                "RB" => {
                    row.rushing_yards = rng.gen_range(800..=1800);
                    row.rushing_touchdowns = rng.gen_range(5..=18);
                    row.receiving_yards = rng.gen_range(100..=800);
                    row.receiving_touchdowns = rng.gen_range(1..=8);
                    row.total_tackles = rng.gen_range(0..=2);
                    row.fumbles_recovered = rng.gen_range(0..=3);
                }
                "WR" | "TE" => {
                    row.rushing_yards = rng.gen_range(0..=100);
                    row.rushing_touchdowns = rng.gen_range(0..=3);
                    row.receiving_yards = rng.gen_range(400..=1500);
                    row.receiving_touchdowns = rng.gen_range(2..=15);
                    row.total_tackles = rng.gen_range(0..=1);
                    row.fumbles_recovered = rng.gen_range(0..=2);
                }
                _ => {
                    row.passing_yards = rng.gen_range(0..=50);
                    row.passing_touchdowns = rng.gen_range(0..=1);
                    row.interceptions_thrown = rng.gen_range(0..=1);
                    row.rushing_yards = rng.gen_range(50..=300);
                    row.rushing_touchdowns = rng.gen_range(1..=6);
                    row.receiving_yards = rng.gen_range(50..=400);
                    row.receiving_touchdowns = rng.gen_range(0..=5);
                    row.total_tackles = rng.gen_range(0..=2);
                    row.sacks = round_to(rng.gen_range(0.0..=0.5), 1);
                    row.interceptions = rng.gen_range(0..=1);
                    row.fumbles_recovered = rng.gen_range(0..=2);
                }
            }

            row
        })
        .collect()
}

/// Replace the demo rows of each sport in one transaction.
pub async fn regenerate(
    pool: &PgPool,
    sports: &[Sport],
    season: &str,
    count: usize,
) -> ScrapeResult<DemoSummary> {
    // ThreadRng is not Send; generate everything before the first await.
    let (basketball, football) = {
        let mut rng = rand::thread_rng();
        (
            sports
                .contains(&Sport::Basketball)
                .then(|| generate_basketball(&mut rng, count)),
            sports
                .contains(&Sport::Football)
                .then(|| generate_football(&mut rng, count)),
        )
    };

    let mut summary = DemoSummary::default();
    let mut tx = pool.begin().await?;

    if let Some(rows) = basketball {
        summary.basketball_deleted = sqlx::query("DELETE FROM basketball_stats WHERE is_demo_data = TRUE")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO basketball_stats (player_name, team_name, season, games_played, \
                 points_per_game, field_goal_percentage, three_point_percentage, \
                 free_throw_percentage, rebounds_per_game, assists_per_game, steals_per_game, \
                 blocks_per_game, turnovers_per_game, minutes_per_game, is_demo_data) ",
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.player_name.clone())
                    .push_bind(row.team_name.clone())
                    .push_bind(season.to_string())
                    .push_bind(row.games_played)
                    .push_bind(row.points_per_game)
                    .push_bind(row.field_goal_percentage)
                    .push_bind(row.three_point_percentage)
                    .push_bind(row.free_throw_percentage)
                    .push_bind(row.rebounds_per_game)
                    .push_bind(row.assists_per_game)
                    .push_bind(row.steals_per_game)
                    .push_bind(row.blocks_per_game)
                    .push_bind(row.turnovers_per_game)
                    .push_bind(row.minutes_per_game)
                    .push_bind(true);
            });
            summary.basketball_inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
    }

    if let Some(rows) = football {
        summary.football_deleted = sqlx::query("DELETE FROM football_stats WHERE is_demo_data = TRUE")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO football_stats (player_name, team_name, position, season, \
                 games_played, passing_yards, passing_touchdowns, interceptions_thrown, \
                 rushing_yards, rushing_touchdowns, receiving_yards, receiving_touchdowns, \
                 total_tackles, sacks, interceptions, fumbles_recovered, is_demo_data) ",
            );
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.player_name.clone())
                    .push_bind(row.team_name.clone())
                    .push_bind(row.position.clone())
                    .push_bind(season.to_string())
                    .push_bind(row.games_played)
                    .push_bind(row.passing_yards)
                    .push_bind(row.passing_touchdowns)
                    .push_bind(row.interceptions_thrown)
                    .push_bind(row.rushing_yards)
                    .push_bind(row.rushing_touchdowns)
                    .push_bind(row.receiving_yards)
                    .push_bind(row.receiving_touchdowns)
                    .push_bind(row.total_tackles)
                    .push_bind(row.sacks)
                    .push_bind(row.interceptions)
                    .push_bind(row.fumbles_recovered)
                    .push_bind(true);
            });
            summary.football_inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
    }

    tx.commit().await?;

    info!(
        season = %season,
        basketball_inserted = summary.basketball_inserted,
        football_inserted = summary.football_inserted,
        "Demo data regenerated"
    );
    Ok(summary)
}
