//! JSON error responses.
//!
//! Every failure a handler can hit is converted into [`ApiError`], which
//! renders as `{ "error": message }` (plus `"field"` for form validation)
//! so the front end can show the message inline next to the form.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::rate_limit::RateLimitError;
use crate::services::error::RecordError;
use crate::services::session::SessionError;
use crate::services::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), field: None }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "admin login required")
    }

    #[must_use]
    pub fn unavailable(feature: &str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, format!("{feature} is not configured"))
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "the database request failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: &self.message, field: self.field };
        (self.status, Json(body)).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            RecordError::Invalid(invalid) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: invalid.message,
                field: Some(invalid.field),
            },
            RecordError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            RecordError::Database(e) => {
                tracing::error!(error = %e, "database request failed");
                Self::internal()
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::TooLarge { .. } => Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
            StorageError::UnsupportedType(_) => Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, err.to_string()),
            e if e.is_client_error() => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            _ => {
                tracing::error!(error = %err, "image storage request failed");
                Self::new(StatusCode::BAD_GATEWAY, "the image storage request failed")
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Disabled => Self::unavailable("admin login"),
            SessionError::InvalidPassword => Self::new(StatusCode::UNAUTHORIZED, "invalid password"),
            SessionError::Database(e) => e.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "database request failed");
        Self::internal()
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string())
    }
}
