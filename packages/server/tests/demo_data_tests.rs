//! Demo data regeneration against a real database.
//!
//! A single test: regeneration deletes demo rows across every season, so
//! concurrent regenerations would race on the counts below.

mod common;

use crate::common::TestHarness;
use sportsbot_core::domains::scraping::demo;
use sportsbot_core::domains::scraping::models::{BasketballStats, FootballStats};
use sportsbot_core::domains::scraping::{load, normalize, LoadTarget, NullPolicy, Sport};
use sportsbot_core::kernel::test_dependencies::basketball_rows;
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn regeneration_replaces_only_demo_rows(ctx: &TestHarness) {
    let scraped = normalize(&basketball_rows(4), NullPolicy::KeepNull);
    load(&ctx.db_pool, &scraped, &LoadTarget::BasketballStats, &ctx.season)
        .await
        .unwrap();

    let first = demo::regenerate(&ctx.db_pool, &Sport::ALL, &ctx.season, 5)
        .await
        .unwrap();
    assert_eq!(first.basketball_inserted, 5);
    assert_eq!(first.football_inserted, 5);

    let second = demo::regenerate(&ctx.db_pool, &Sport::ALL, &ctx.season, 3)
        .await
        .unwrap();
    assert_eq!(second.basketball_deleted, 5);
    assert_eq!(second.football_deleted, 5);

    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, true).await.unwrap(),
        3
    );
    assert_eq!(
        FootballStats::count(&ctx.db_pool, &ctx.season, true).await.unwrap(),
        3
    );
    // Scraped rows survive every regeneration
    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, false).await.unwrap(),
        4
    );

    // Only the selected sport is touched
    let football_only = demo::regenerate(&ctx.db_pool, &[Sport::Football], &ctx.season, 2)
        .await
        .unwrap();
    assert_eq!(football_only.basketball_deleted, 0);
    assert_eq!(football_only.basketball_inserted, 0);
    assert_eq!(
        BasketballStats::count(&ctx.db_pool, &ctx.season, true).await.unwrap(),
        3
    );
    assert_eq!(
        FootballStats::count(&ctx.db_pool, &ctx.season, true).await.unwrap(),
        2
    );

    let demo_rows = FootballStats::find(&ctx.db_pool, Some(&ctx.season), 10)
        .await
        .unwrap();
    assert!(demo_rows.iter().all(|r| r.is_demo_data));
    assert!(demo_rows
        .iter()
        .all(|r| r.player_name.as_deref().is_some_and(|n| n.contains("Demo"))));

    // 5000 football rows need 85,000 bind parameters in total
    let large = demo::regenerate(&ctx.db_pool, &[Sport::Football], &ctx.season, 5000)
        .await
        .unwrap();
    assert_eq!(large.football_deleted, 2);
    assert_eq!(large.football_inserted, 5000);
    assert_eq!(
        FootballStats::count(&ctx.db_pool, &ctx.season, true).await.unwrap(),
        5000
    );
}
