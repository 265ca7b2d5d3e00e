use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::AppState;

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs();

    match state.executor.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "uptime": uptime,
                "database": "connected"
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "ERROR",
                    "uptime": uptime,
                    "error": e.to_string()
                })),
            )
        }
    }
}
