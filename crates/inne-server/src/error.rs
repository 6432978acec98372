//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`inne_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on storage calls.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: inne_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: inne_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }
}

impl From<inne_core::Error> for AppError {
    fn from(e: inne_core::Error) -> Self {
        Self::new(e)
    }
}

/// Stable machine-readable code for each error kind.
fn error_code(err: &inne_core::Error) -> &'static str {
    match err {
        inne_core::Error::NotFound { .. } => "not_found",
        inne_core::Error::Validation(_) => "validation_error",
        inne_core::Error::ForeignKey { .. } => "foreign_key_violation",
        inne_core::Error::Conflict(_) => "conflict",
        inne_core::Error::Database { .. } => "database_error",
        inne_core::Error::Io { .. } => "io_error",
        inne_core::Error::Internal(_) => "internal_error",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in handler"
            );
        }

        let mut body = json!({
            "error": self.inner.to_string(),
            "code": error_code(&self.inner),
            "request_id": self.request_id,
        });
        if let inne_core::Error::ForeignKey { field, .. } = &self.inner {
            body["field"] = json!(field);
        }

        (status, axum::Json(body)).into_response()
    }
}
