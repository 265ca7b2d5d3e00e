use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::errors::AppError;

/// Proof that the request carried `admin=true` in its query string.
/// Rejection happens before the handler runs, so a refused request never
/// touches the database.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

#[derive(Debug, Deserialize)]
struct AdminFlag {
    admin: Option<String>,
}

impl<S> FromRequestParts<S> for AdminAccess
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(flag) = Query::<AdminFlag>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Forbidden("Admin access required".to_string()))?;

        match flag.admin.as_deref() {
            Some("true") => Ok(AdminAccess),
            _ => Err(AppError::Forbidden("Admin access required".to_string())),
        }
    }
}

/// Every origin, method and header is allowed.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
