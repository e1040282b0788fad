//! CLI for regenerating demo stat rows
//!
//! Demo rows carry `is_demo_data = true` and are the only rows this tool
//! deletes, so scraped stats survive any number of reseeds.

use anyhow::{bail, Context, Result};
use clap::Parser;
use sportsbot_core::config::Config;
use sportsbot_core::domains::scraping::demo::{self, DEFAULT_DEMO_PLAYERS};
use sportsbot_core::domains::scraping::Sport;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seed_demo_data")]
#[command(about = "Replace demo player stats with freshly generated rows")]
struct Cli {
    /// Seed basketball demo rows
    #[arg(long)]
    basketball: bool,

    /// Seed football demo rows
    #[arg(long)]
    football: bool,

    /// Seed every sport (the default)
    #[arg(long)]
    all: bool,

    /// Season stored on the generated rows
    #[arg(long, default_value = "2023")]
    season: String,

    /// Players generated per sport
    #[arg(long, default_value_t = DEFAULT_DEMO_PLAYERS)]
    count: usize,
}

impl Cli {
    /// Selected sports; no selection means every sport.
    fn sports(&self) -> Vec<Sport> {
        let mut sports = Vec::new();
        if self.basketball {
            sports.push(Sport::Basketball);
        }
        if self.football {
            sports.push(Sport::Football);
        }
        if self.all || sports.is_empty() {
            return Sport::ALL.to_vec();
        }
        sports
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let sports = cli.sports();
    if cli.count == 0 {
        bail!("--count must be at least 1");
    }

    let config = Config::from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let summary = demo::regenerate(&pool, &sports, &cli.season, cli.count)
        .await
        .context("Failed to regenerate demo data")?;

    for sport in &sports {
        let (deleted, inserted) = match sport {
            Sport::Basketball => (summary.basketball_deleted, summary.basketball_inserted),
            Sport::Football => (summary.football_deleted, summary.football_inserted),
        };
        tracing::info!(
            sport = %sport,
            season = %cli.season,
            deleted,
            inserted,
            "Demo data regenerated"
        );
    }

    Ok(())
}
