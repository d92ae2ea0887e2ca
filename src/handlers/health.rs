use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{HealthResponse, ServiceInfo};
use crate::state::AppState;

/// Root endpoint with static service metadata
pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

/// Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse::healthy())
}

/// Readiness check endpoint: the converter program must be launchable.
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, StatusCode> {
    let conversion = state.conversion.clone();
    let available = tokio::task::spawn_blocking(move || conversion.converter().is_available())
        .await
        .unwrap_or(false);

    if available {
        info!(converter = %state.conversion.converter().name(), "Readiness check passed");
        Ok(StatusCode::OK)
    } else {
        warn!(
            converter = %state.conversion.converter().name(),
            "Readiness check failed - converter unavailable"
        );
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
