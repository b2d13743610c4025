use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// A single field-level validation failure, reported under `errors` in the
/// response envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<store::StoreError> for ApiError {
    fn from(err: store::StoreError) -> Self {
        match err {
            store::StoreError::DuplicateKey { message } => ApiError::Duplicate(message),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

fn envelope(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => envelope(
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": "Validation errors", "errors": errors }),
            ),
            ApiError::Auth(message) => envelope(
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": message }),
            ),
            ApiError::NotFound(message) => envelope(
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Duplicate(message) => envelope(
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": message }),
            ),
            ApiError::Storage(detail) => {
                tracing::error!(%detail, "request failed on storage error");
                let mut body = json!({ "success": false, "message": "Internal server error" });
                if cfg!(debug_assertions) {
                    body["error"] = Value::String(detail);
                }
                envelope(StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        }
    }
}
