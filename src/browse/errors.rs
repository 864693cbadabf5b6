//! # Browse Errors
//!
//! Aggregates the errors of every browse stage and maps them onto HTTP
//! responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::count::CountError;
use crate::cursor::CursorError;
use crate::executor::ExecutorError;
use crate::query::QueryError;

/// Result type for browse operations
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Browse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowseError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Count(#[from] CountError),

    /// Body missing, not JSON, or not the expected shape
    #[error("Invalid request body: {reason}")]
    InvalidBody { status: StatusCode, reason: String },
}

impl BrowseError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BrowseError::Query(err) => err.code(),
            BrowseError::Cursor(err) => err.code(),
            BrowseError::Executor(err) => err.code(),
            BrowseError::Count(err) => err.code(),
            BrowseError::InvalidBody { .. } => "INVALID_REQUEST_BODY",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            BrowseError::Query(_) => StatusCode::BAD_REQUEST,
            BrowseError::Cursor(CursorError::NoMorePages | CursorError::NoPriorPage) => {
                StatusCode::BAD_REQUEST
            }

            // 404 Not Found
            BrowseError::Cursor(CursorError::UnknownSession(_)) => StatusCode::NOT_FOUND,

            // 409 Conflict
            BrowseError::Cursor(CursorError::ConcurrentCursorMutation(_)) => StatusCode::CONFLICT,

            BrowseError::Executor(err) => executor_status(err),
            BrowseError::Count(CountError::CountUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            BrowseError::Count(CountError::Query(_)) => StatusCode::BAD_REQUEST,
            BrowseError::Count(CountError::Executor(err)) => executor_status(err),

            // 400, 415 or 422 as decided by the JSON extractor
            BrowseError::InvalidBody { status, .. } => *status,
        }
    }

    /// Rejected or timed-out statement, if any
    pub fn statement(&self) -> Option<&str> {
        match self {
            BrowseError::Executor(err) | BrowseError::Count(CountError::Executor(err)) => {
                err.statement()
            }
            _ => None,
        }
    }
}

impl From<JsonRejection> for BrowseError {
    fn from(rejection: JsonRejection) -> Self {
        BrowseError::InvalidBody {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

fn executor_status(err: &ExecutorError) -> StatusCode {
    match err {
        ExecutorError::RejectedStatement { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ExecutorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ExecutorError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl From<&BrowseError> for ErrorResponse {
    fn from(err: &BrowseError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
            kind: err.code().to_string(),
            statement: err.statement().map(str::to_string),
        }
    }
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.code(), status = status.as_u16(), error = %self, "browse request failed");
        } else {
            tracing::warn!(kind = self.code(), status = status.as_u16(), error = %self, "browse request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        let cases: Vec<(BrowseError, StatusCode)> = vec![
            (QueryError::InvalidFilter("x".into()).into(), StatusCode::BAD_REQUEST),
            (CursorError::NoPriorPage.into(), StatusCode::BAD_REQUEST),
            (CursorError::NoMorePages.into(), StatusCode::BAD_REQUEST),
            (
                CursorError::ConcurrentCursorMutation("s".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                ExecutorError::rejected("s", "r").into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ExecutorError::timeout("s", Duration::from_secs(1)).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ExecutorError::unavailable("down").into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CountError::unavailable("stats").into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CursorError::UnknownSession("s".into()).into(), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err.code());
        }
    }

    #[test]
    fn test_response_carries_statement_verbatim() {
        let err: BrowseError =
            ExecutorError::rejected("SELECT * FROM a.b WHERE x = 1 LIMIT 5", "needs filtering").into();
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, 422);
        assert_eq!(body.kind, "REJECTED_STATEMENT");
        assert_eq!(
            body.statement.as_deref(),
            Some("SELECT * FROM a.b WHERE x = 1 LIMIT 5")
        );
    }

    #[test]
    fn test_count_executor_errors_keep_their_kind() {
        let err: BrowseError = CountError::from(ExecutorError::timeout("c", Duration::from_millis(5))).into();
        assert_eq!(err.code(), "EXECUTOR_TIMEOUT");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.statement(), Some("c"));
    }
}
