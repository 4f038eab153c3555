use aurora_core::Error;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::error;

/// Error body returned by every endpoint: `{status, message, code, timestamp}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(Error::Validation(rejection.body_text()))
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Persistence(_) => (StatusCode::SERVICE_UNAVAILABLE, "PERSISTENCE_ERROR"),
            Error::Provider { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = json!({
            "status": "error",
            "message": self.0.to_string(),
            "code": code,
            "timestamp": Utc::now(),
        });
        (status, Json(body)).into_response()
    }
}
