//! Types for reporting errors that happened during a request.
//!
//! If your function reads from the greeting store or validates input, you
//! likely want to return an [`ApiResult`]. A missing greeting is a
//! [`ClientError`] and must never be reported as a storage failure; the two
//! map to different status codes and bodies.

use axum::{extract::rejection::QueryRejection, response::IntoResponse, Json};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::catch_panic::ResponseForPanic;
use utoipa::ToSchema;

/// A standard error response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// A short error category.
    #[schema(example = "Language not found")]
    error: String,
    /// A description of the error.
    #[schema(example = "The requested language is not available")]
    message: String,
}

impl ErrorBody {
    pub(crate) fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    /// The error category.
    pub fn error(&self) -> &str {
        self.error.as_ref()
    }

    /// The error message.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }
}

/// An error from our API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An error caused by the client.
    #[error("{0}")]
    ClientError(#[from] ClientError),
    /// An internal error.
    #[error("{0}")]
    InternalError(#[from] InternalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ClientError(e) => e.into_response(),
            ApiError::InternalError(e) => {
                tracing::error!("internal error: {}", e);
                e.into_response()
            }
        }
    }
}

/// The result of calling API-related functions.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::InternalError(InternalError::SqlxError(e))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut invalid_fields = String::new();
        for (k, v) in e.field_errors() {
            let mut codes = String::new();
            for e in v {
                codes += &format!("{},", e.code);
            }
            let codes = codes.trim_end_matches(',');
            invalid_fields += &format!("{k} ({codes}),");
        }
        let invalid_fields = invalid_fields.trim_end_matches(',');
        ApiError::ClientError(ClientError::UnprocessableEntity(format!(
            "invalid field(s): {invalid_fields}"
        )))
    }
}

/// Errors caused by the client.
/// The client can do something to fix these.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No greeting is stored under the requested language code.
    #[error("The requested language is not available")]
    LanguageNotFound,
    /// Validation errors.
    #[error("{0}")]
    UnprocessableEntity(String),
    /// Custom error.
    #[error("{1}")]
    Custom(StatusCode, String),
}

impl From<QueryRejection> for ClientError {
    fn from(value: QueryRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let (status, error) = match self {
            Self::LanguageNotFound => (StatusCode::NOT_FOUND, "Language not found".to_string()),
            Self::UnprocessableEntity(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable entity".to_string(),
            ),
            Self::Custom(status, _) => (
                status,
                status.canonical_reason().unwrap_or("Error").to_string(),
            ),
        };
        (status, Json(ErrorBody::new(error, message))).into_response()
    }
}

/// An internal error.
/// The client cannot do anything about this.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// An [`sqlx`] error.
    #[error("{0}")]
    SqlxError(#[from] sqlx::Error),
    /// The storage call did not answer within the configured timeout.
    #[error("storage call timed out after {0:?}")]
    StorageTimeout(Duration),
    /// A request or response body could not be buffered.
    #[error("failed to buffer body: {0}")]
    BodyError(String),
    /// Other miscellaneous errors.
    #[error("{0}")]
    Other(String),
}

impl IntoResponse for InternalError {
    fn into_response(self) -> axum::response::Response {
        // The underlying diagnostic is passed through to the client.
        let body = ErrorBody::new("Internal server error", self.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// A handler for converting panics into proper responses for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicHandler;

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _: Box<dyn std::any::Any + Send + 'static>,
    ) -> http::Response<Self::ResponseBody> {
        ApiError::InternalError(InternalError::Other("panic".to_string())).into_response()
    }
}
