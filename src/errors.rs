use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Client input that is missing or malformed. Always reported as 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Contact number must be exactly 10 digits")]
    InvalidContact,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("Invalid time format. Use HH:MM")]
    InvalidTime,

    #[error("Invalid month or year")]
    InvalidMonthYear,

    #[error("Amount must be a non-negative number")]
    InvalidAmount,
}

/// Failures coming out of the query executor.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database unavailable after {attempts} attempts: {source}")]
    Unavailable {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Query(QueryError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Query(QueryError::Unavailable { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
