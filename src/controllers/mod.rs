pub mod bookings;
pub mod health;
pub mod notifications;
pub mod test;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(test::routes())
        .merge(bookings::routes())
        .merge(notifications::routes())
}

pub async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}
