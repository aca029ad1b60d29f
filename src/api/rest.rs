//! REST API Handlers
//!
//! Serves the storage layout report, on-demand refreshes and health
//! probes.

use crate::config::StorageConfig;
use crate::error::Error;
use crate::layout::StorageService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

// =============================================================================
// Response Types
// =============================================================================

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&Error> for ApiErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            error: err.code().into(),
            message: err.to_string(),
            details: err.is_transient().then(|| "retry may succeed".to_string()),
        }
    }
}

fn error_response(err: Error) -> Response {
    error!("Storage layout request failed: {}", err);
    (err.status_code(), Json(ApiErrorResponse::from(&err))).into_response()
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    service: Arc<StorageService>,
}

impl RestRouter {
    /// Create a new REST router
    pub fn new(service: Arc<StorageService>) -> Self {
        Self { service }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            service: self.service,
        };

        Router::new()
            // Storage endpoints
            .route("/v1/storage/layout", get(get_layout))
            .route("/v1/storage/layout/refresh", post(refresh_layout))
            .route("/v1/storage/config", get(get_config))
            // Health endpoints
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: Arc<StorageService>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Current (cached) storage layout
async fn get_layout(State(state): State<AppState>) -> Response {
    match state.service.current().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Re-collect the storage layout
async fn refresh_layout(State(state): State<AppState>) -> Response {
    info!("Refreshing storage layout");
    match state.service.refresh().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Active filter and virtual mount configuration
async fn get_config(State(state): State<AppState>) -> Json<StorageConfig> {
    Json(state.service.config().clone())
}

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.service.is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "storage layout not collected")
    }
}
