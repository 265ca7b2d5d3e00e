use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::errors::AppError;
use crate::models::Booking;
use crate::services::filter::{build_filter, FilterParams};
use crate::services::validation::{validate_create, validate_update, BookingPayload};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/filter", get(filter_bookings))
        .route(
            "/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
}

/* ---------- helpers ---------- */

fn not_found() -> AppError {
    AppError::NotFound("Booking not found".to_string())
}

// Accepts both the numeric id and its zero-padded form ("00042")
fn parse_booking_id(raw: &str) -> Result<i64, AppError> {
    raw.trim().parse::<i64>().map_err(|_| not_found())
}

fn body(payload: Result<Json<BookingPayload>, JsonRejection>) -> Result<BookingPayload, AppError> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/* ---------- READ ---------- */

// GET /api/bookings
async fn list_bookings(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = Booking::all(&state.executor).await?;
    Ok(Json(bookings))
}

// GET /api/bookings/filter?date=|month=&year=|branch=
async fn filter_bookings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let (predicate, values) = build_filter(&params)?;

    let bookings = Booking::filtered(&state.executor, &predicate, &values).await?;
    Ok(Json(bookings))
}

// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let id = parse_booking_id(&id)?;

    Booking::find_by_id(&state.executor, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/* ---------- WRITE ---------- */

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let booking = validate_create(&body(payload)?)?;

    let booking_id = Booking::create(&state.executor, &booking).await?;
    info!(booking_id = %booking_id, branch = %booking.branch, "Booking created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking created successfully",
            "bookingId": booking_id
        })),
    ))
}

// PUT /api/bookings/{id}
async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<BookingPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let booking = validate_update(&body(payload)?)?;
    let id = parse_booking_id(&id)?;

    if !Booking::update(&state.executor, id, &booking).await? {
        return Err(not_found());
    }
    info!(id, "Booking updated");

    Ok(Json(json!({ "message": "Booking updated successfully" })))
}

// DELETE /api/bookings/{id}
async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_booking_id(&id)?;

    if !Booking::delete(&state.executor, id).await? {
        return Err(not_found());
    }
    info!(id, "Booking deleted");

    Ok(Json(json!({ "message": "Booking deleted successfully" })))
}
