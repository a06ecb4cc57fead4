//! Health check handler

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::state::AppState;
use crate::response::ResponseData;

/// Health check response data
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: &'static str,
}

/// Health check endpoint
///
/// Pings PostgreSQL. Failure details go to the log, never to the caller.
///
/// - Healthy: 200 OK + {status: true, result: {timestamp_ms, version}}
/// - Unhealthy: 503 Service Unavailable + {status: false, message: "unavailable"}
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = ResponseData<HealthResponse>, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ResponseData<HealthResponse> {
    match state.db.health_check().await {
        Ok(()) => ResponseData::success(HealthResponse {
            timestamp_ms: Utc::now().timestamp_millis(),
            version: env!("GIT_HASH"),
        })
        .with_code(StatusCode::OK),
        Err(e) => {
            tracing::error!(error = %e, "[HEALTH] PostgreSQL ping failed");
            ResponseData::failure("SERVICE_UNAVAILABLE", "unavailable")
                .with_code(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
