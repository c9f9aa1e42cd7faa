use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use green_life_expo_api::app::{create_app, AppState};
use green_life_expo_api::config::Config;
use green_life_expo_api::jobs::{JobScheduler, PoolMetricsJob, RateLimitCleanupJob};
use green_life_expo_api::middleware::{init_metrics, logging::init_logging};
use green_life_expo_api::services::{Backend, HttpIdentityProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Green Life Expo API v{}", env!("CARGO_PKG_VERSION"));

    let backend = Backend::connect(&config).await?;
    let identity = Arc::new(HttpIdentityProvider::new(&config.backend)?);
    let addr = config.socket_addr()?;
    let state = AppState::new(config, backend, identity)?;

    let mut scheduler = JobScheduler::new();
    if let Some(pool) = state.backend.pool() {
        scheduler.register(PoolMetricsJob::new(pool.clone()));
    }
    if let Some(limiter) = &state.rate_limiter {
        scheduler.register(RateLimitCleanupJob::new(limiter.clone()));
    }
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown(Duration::from_secs(5)).await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
