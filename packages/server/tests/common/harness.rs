//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container across all tests in a binary.
//! The container and migrations are initialized on the first test, then reused.

use std::sync::Arc;

use anyhow::{Context, Result};
use sportsbot_core::domains::scraping::jobs::{start_worker_pool, ScrapeWorkerPool};
use sportsbot_core::kernel::{BaseExtractor, MockExtractor, PoolConfig, ServerDeps};
use sportsbot_core::server::{build_app, AppState};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Base URL handed to extractors; mocks only match on path fragments.
pub const TEST_BASE_URL: &str = "https://stats.test/stats";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Per-test context over the shared database.
///
/// Stat tables are shared between tests, so each harness hands out its own
/// season. Queries filtered on `season` only ever see this test's rows.
///
/// ```ignore
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let deps = ctx.deps(MockExtractor::new("static"), MockExtractor::new("dynamic"));
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    /// Unique season label for this test
    pub season: String,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            db_pool,
            season: unique_season(),
        })
    }

    /// Dependencies wired to the given mock extractors.
    pub fn deps(
        &self,
        static_extractor: impl BaseExtractor + 'static,
        dynamic_extractor: impl BaseExtractor + 'static,
    ) -> ServerDeps {
        self.deps_with(Arc::new(static_extractor), Arc::new(dynamic_extractor))
    }

    /// Like `deps`, keeping handles on the mocks for call assertions.
    pub fn deps_with(
        &self,
        static_extractor: Arc<dyn BaseExtractor>,
        dynamic_extractor: Arc<dyn BaseExtractor>,
    ) -> ServerDeps {
        ServerDeps::new(
            self.db_pool.clone(),
            static_extractor,
            dynamic_extractor,
            TEST_BASE_URL,
            self.season.clone(),
        )
    }

    /// Router plus its worker pool, with extractors that return no rows.
    pub fn app(&self) -> (axum::Router, Arc<ScrapeWorkerPool>) {
        let deps = self.deps(MockExtractor::new("static"), MockExtractor::new("dynamic"));
        let pool = Arc::new(start_worker_pool(
            deps.clone(),
            PoolConfig {
                workers: 1,
                ..PoolConfig::default()
            },
        ));
        (build_app(AppState::new(deps, pool.clone())), pool)
    }
}

/// `2YYY-NNNN`: passes season validation and never collides across tests.
fn unique_season() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000;
    let year = 2100 + (Uuid::new_v4().as_u128() % 800);
    format!("{}-{:04}", year, n)
}
