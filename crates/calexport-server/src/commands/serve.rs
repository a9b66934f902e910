//! Serve command: runs the HTTP server in the foreground until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::routes;
use crate::state::AppState;

/// Starts the server, applying command-line overrides to `config`.
pub async fn run(
    mut config: ServerConfig,
    bind: Option<SocketAddr>,
    records: Option<PathBuf>,
) -> ServerResult<()> {
    if let Some(bind) = bind {
        config = config.with_bind(bind);
    }
    if let Some(records) = records {
        config = config.with_records_path(records);
    }

    let store = super::open_store(&config)?;
    let addr = config.bind;
    info!(
        records = store.len(),
        views = config.views.len(),
        ics_route = %config.ics_route,
        "Starting server"
    );

    let app = routes::router(AppState::new(config, Arc::new(store)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
