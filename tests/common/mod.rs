#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use celebration_house::config::{AppConfig, Config, DatabaseConfig, LogFormat, RetryConfig};
use celebration_house::AppState;

/// Points at a port nothing listens on, so any query would fail fast.
pub fn offline_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "celebration_house=debug".to_string(),
            log_format: LogFormat::Pretty,
            shutdown_timeout_secs: 10,
        },
        database: DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "root".to_string(),
            password: String::new(),
            name: "celebration_house".to_string(),
            pool_size: 2,
            connect_timeout_secs: 1,
            idle_timeout_secs: 60,
            keepalive_secs: 300,
        },
        retry: RetryConfig {
            attempts: 0,
            backoff_ms: 0,
        },
    }
}

pub fn offline_app() -> Router {
    celebration_house::app(AppState::new(offline_config()))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn booking_body(name: &str, date: &str, branch: &str) -> Value {
    serde_json::json!({
        "customerName": name,
        "contactNumber": "9876543210",
        "eventDate": date,
        "eventTime": "18:30:00",
        "branch": branch,
        "selectedPackage": "Gold",
        "amount": 15000.5,
        "celebrationType": "Birthday"
    })
}

pub fn filter_uri(params: &[(&str, &str)]) -> String {
    format!(
        "/api/bookings/filter?{}",
        serde_urlencoded::to_string(params).unwrap()
    )
}
