use axum::{extract::State, routing::get, Json, Router};
use chrono::{Days, Local, NaiveDate};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::AppError;
use crate::middleware::AdminAccess;
use crate::models::Booking;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/notifications", get(tomorrow_notifications))
}

fn tomorrow(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

fn summary(count: usize) -> String {
    match count {
        0 => "No bookings scheduled for tomorrow".to_string(),
        1 => "1 booking scheduled for tomorrow".to_string(),
        n => format!("{n} bookings scheduled for tomorrow"),
    }
}

// GET /api/notifications?admin=true
async fn tomorrow_notifications(
    _admin: AdminAccess,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let date = tomorrow(Local::now().date_naive());
    let bookings = Booking::on_date(&state.executor, date).await?;

    Ok(Json(json!({
        "message": summary(bookings.len()),
        "bookings": bookings
    })))
}
