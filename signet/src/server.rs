//! Server lifecycle management
//!
//! Owns the listening socket and the graceful-shutdown path for the
//! assembled request pipeline.

use axum::Router;
use tracing::{error, info};

use signet_core::bootstrap::RegistryHandle;

/// Serves the assembled pipeline until a shutdown signal arrives.
pub struct SignetServer {
    registry: RegistryHandle,
    router: Router,
}

impl SignetServer {
    pub const fn new(registry: RegistryHandle, router: Router) -> Self {
        Self { registry, router }
    }

    /// Bind, serve, and wait for shutdown. Any serving failure is
    /// propagated so the process exits non-zero.
    pub async fn start(self) -> anyhow::Result<()> {
        let address = self.registry.config.http_address();
        let addr: std::net::SocketAddr = address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HTTP address '{address}': {e}"))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind HTTP address {addr}: {e}"))?;

        info!("HTTP server listening on {}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {e}"))?;

        info!("HTTP server shut down gracefully");

        info!("Closing database connection pool...");
        self.registry.pool.close().await;
        info!("Database pool closed");

        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
