//! HTTP server lifecycle.
//!
//! Owns binding, spawning, and graceful shutdown of the axum server. The
//! router itself lives in [`super::router`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::config;
use crate::core_state::CoreState;

/// Handle to a running server. Dropping it does NOT stop the server;
/// call [`ServerHandle::shutdown`] for a graceful stop.
pub struct ServerHandle {
    /// The address the server actually bound (useful with port 0).
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ServerHandle {
    /// Signal the server to stop accepting connections and drain.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the server on the configured address (`PILLBOX_ADDR`).
pub async fn start_server(core: Arc<CoreState>) -> Result<ServerHandle, std::io::Error> {
    start_server_on(core, config::bind_addr()).await
}

/// Start the server on an explicit address. Tests pass `127.0.0.1:0`
/// and read the bound port back from the handle.
pub async fn start_server_on(
    core: Arc<CoreState>,
    addr: SocketAddr,
) -> Result<ServerHandle, std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = app_router(core);

    tokio::spawn(async move {
        let serve = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = serve.await {
            tracing::error!(error = %e, "server error");
        }
    });

    tracing::info!(addr = %local_addr, "server listening");

    Ok(ServerHandle {
        addr: local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
