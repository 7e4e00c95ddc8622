use axum::extract::State;
use serde::Serialize;

use crate::app::AppContext;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(ctx): State<AppContext>) -> ApiResult<HealthPayload> {
    match ctx.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(HealthPayload {
            status: "ok",
            timestamp: chrono::Utc::now(),
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}
