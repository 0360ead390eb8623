//! HTTP error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error, warn};

use thesaurus_core::Error;

/// A failed request, rendered with the status declared by its [`Error`].
///
/// JSON-P requests carry their callback so the error body is wrapped the
/// same way a success body would be.
#[derive(Debug)]
pub struct ApiError {
    inner: Error,
    callback: Option<String>,
}

impl ApiError {
    pub fn with_callback(mut self, callback: Option<&str>) -> Self {
        self.callback = callback.map(str::to_string);
        self
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }

    fn body(&self) -> serde_json::Value {
        match &self.inner {
            Error::Validation(messages) => json!({
                "error": self.inner.message(),
                "messages": messages,
            }),
            other => json!({ "error": other.message() }),
        }
    }
}

impl From<Error> for ApiError {
    fn from(inner: Error) -> Self {
        Self {
            inner,
            callback: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.inner.is_upstream() || status.is_server_error() {
            error!(subsystem = "api", status = status.as_u16(), error = %self.inner, "Request failed");
        } else if status == StatusCode::FORBIDDEN {
            warn!(subsystem = "api", error = %self.inner, "Request denied");
        } else {
            debug!(subsystem = "api", status = status.as_u16(), error = %self.inner, "Request rejected");
        }

        let body = self.body();
        match self.callback {
            Some(callback) => (
                status,
                [(header::CONTENT_TYPE, "application/javascript")],
                format!("{}({});", callback, body),
            )
                .into_response(),
            None => (status, axum::Json(body)).into_response(),
        }
    }
}

/// Handler result type.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
