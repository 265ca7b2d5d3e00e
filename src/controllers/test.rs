use axum::{routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new().route("/test", get(test_handler))
}

async fn test_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Celebration House API is working",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
