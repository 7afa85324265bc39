use crate::{AppState, dto::HealthResponse};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::warn;

/// GET /health
/// Response: 200 OK when the post store answers a ping, 503 otherwise
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let timestamp = Utc::now().timestamp();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                timestamp,
            }),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    timestamp,
                }),
            )
        }
    }
}
