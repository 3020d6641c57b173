//! Names Search Server
//!
//! Main entry point: runs the index refresh loop in the background and
//! serves suggestion queries over HTTP.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use names_search::{
    build_router, run_refresh_loop, store::open_store, AppState, HttpCatalogSource, IndexStatus,
    PrefixQueryService, RefreshPipeline, RefreshSchedule, ServiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "names_search=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("Starting names-search");

    let config = ServiceConfig::load()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        catalog = %config.catalog.url,
        backend = ?config.store.backend,
        batch_size = config.index.batch_size,
        rebuild_interval_secs = config.index.rebuild_interval_secs,
        "Configuration loaded"
    );

    // One store handle shared by the builder and every request
    let store = open_store(&config.store)?;
    let status = IndexStatus::new();

    let source = Arc::new(HttpCatalogSource::new(&config.catalog)?);
    let pipeline = RefreshPipeline::new(
        source,
        store.clone(),
        config.index.batch_size,
        status.clone(),
    );

    // Start background refresh loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedule = RefreshSchedule::from(&config.index);
    let refresh_task = tokio::spawn(run_refresh_loop(pipeline, schedule, shutdown_rx));

    let state = AppState {
        query: Arc::new(PrefixQueryService::new(store, &config.query)),
        status,
    };
    let app = build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh_task.await {
        tracing::error!(error = %e, "Refresh task ended abnormally");
    }

    Ok(())
}
