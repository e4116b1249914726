use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use cafeteria_rs::{
    create_app, init_observability, prepare_database, repositories::create_pool,
    shutdown_observability, AppState, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_environment().context("failed to load configuration")?;

    init_observability(&config.observability)?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );

    let metrics = Arc::new(Metrics::new()?);

    let pool = create_pool(&config.database)
        .await
        .context("failed to open database")?;
    prepare_database(&pool, metrics.clone(), config.database.seed_on_startup)
        .await
        .context("failed to prepare database")?;

    let state = AppState::new(pool.clone(), metrics);
    let app = create_app(state, &config);

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("invalid bind address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
    shutdown_observability().await;
}
