pub mod api;
pub mod auth;
pub mod config;
pub mod core_state;
pub mod db;
pub mod hardware;
pub mod models;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Bring up the service and run until Ctrl-C.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Pillbox starting v{}", config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("Failed to create data directory {}: {e}", data_dir.display()))?;

    let core = Arc::new(core_state::CoreState::new());

    // Run migrations up front so a broken schema fails at startup,
    // not on the first request.
    core.open_db()
        .map_err(|e| format!("Failed to open database: {e}"))?;

    let mut handle = api::start_server(core)
        .await
        .map_err(|e| format!("Failed to start server: {e}"))?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;

    tracing::info!("shutdown signal received");
    handle.shutdown();

    Ok(())
}
