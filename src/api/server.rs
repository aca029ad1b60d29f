//! API Server
//!
//! Runs the REST server for storage layout reports.

use crate::error::{Error, Result};
use crate::layout::StorageService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::rest::RestRouter;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// REST API bind address
    pub rest_addr: SocketAddr,
    /// Collect the layout before accepting requests
    pub warm_cache: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            warm_cache: true,
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// REST API server for storage layout reports
pub struct ApiServer {
    config: ApiServerConfig,
    service: Arc<StorageService>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, service: Arc<StorageService>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            service,
            shutdown_tx,
        }
    }

    /// Run the API server until shutdown
    pub async fn run(&self) -> Result<()> {
        info!("Starting storage layout API server");
        info!("  REST API: {}", self.config.rest_addr);

        let shutdown_rx = self.shutdown_tx.subscribe();

        if self.config.warm_cache {
            // A failed first collection is retried on the first request
            if let Err(e) = self.service.refresh().await {
                warn!("Initial storage layout collection failed: {}", e);
            }
        }

        let rest_handle = self.spawn_rest_server(shutdown_rx);

        match rest_handle.await {
            Ok(result) => result?,
            Err(e) => {
                error!("REST server task failed: {:?}", e);
                return Err(Error::Internal(format!("REST server task failed: {}", e)));
            }
        }

        Ok(())
    }

    /// Spawn the REST server
    fn spawn_rest_server(
        &self,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let addr = self.config.rest_addr;
        let service = self.service.clone();

        tokio::spawn(async move { run_rest_server(addr, service, shutdown_rx).await })
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Handle for triggering shutdown from another task
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}

/// Run the REST API server
async fn run_rest_server(
    addr: SocketAddr,
    service: Arc<StorageService>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let app = RestRouter::new(service).build();

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        Error::Internal(format!("Failed to bind REST server: {}", e))
    })?;

    info!("REST API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("REST server shutting down");
        })
        .await
        .map_err(|e| Error::Internal(format!("REST server error: {}", e)))?;

    Ok(())
}
