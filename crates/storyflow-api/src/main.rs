//! Storyflow API server entry point.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use storyflow_catalog::application::source::CatalogSource;
use storyflow_catalog::application::yaml_source::YamlCatalogSource;
use storyflow_core::clock::SystemClock;
use storyflow_ledger::application::ledger::RewardLedger;
use storyflow_ledger::application::notifier::StatsNotifier;
use storyflow_ledger::application::ports::PlayerStateStore;
use storyflow_narrative::application::engine::FlowEngine;
use storyflow_store::memory_player_store::InMemoryPlayerStateStore;
use storyflow_store::pg_catalog_source::PgCatalogSource;
use storyflow_store::pg_player_store::PgPlayerStateStore;
use storyflow_store::schema;

use storyflow_api::config::{Backend, Config};
use storyflow_api::error::AppError;
use storyflow_api::state::AppState;
use storyflow_api::{telemetry, watchdog};

const WATCHDOG_PERIOD: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Storyflow API server");

    let (source, store): (Arc<dyn CatalogSource>, Arc<dyn PlayerStateStore>) =
        match &config.backend {
            Backend::Postgres { database_url } => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(database_url)
                    .await?;
                schema::migrate(&pool).await?;
                (
                    Arc::new(PgCatalogSource::new(pool.clone())),
                    Arc::new(PgPlayerStateStore::new(pool)),
                )
            }
            Backend::CatalogFile { path } => {
                tracing::warn!(path = %path.display(), "player profiles are kept in memory only");
                (
                    Arc::new(YamlCatalogSource::from_path(path)?),
                    Arc::new(InMemoryPlayerStateStore::new()),
                )
            }
        };

    let ledger = RewardLedger::new(store.clone(), Arc::new(SystemClock), StatsNotifier::default())
        .with_completion_xp(config.story_completion_xp);
    let engine = FlowEngine::new(source, ledger, Arc::new(SystemClock), config.engine_config());
    let state = AppState::new(engine, store);

    let _watchdog = config
        .app_idle_timeout
        .map(|_| watchdog::spawn(state.clone(), WATCHDOG_PERIOD));

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, storyflow_api::app(state)).await?;

    telemetry.shutdown();
    Ok(())
}
