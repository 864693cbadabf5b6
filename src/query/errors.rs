//! # Query Compilation Errors
//!
//! Errors raised while turning a browse request into statement text.
//! None of these ever reach the executor.

use thiserror::Error;

/// Result type for query compilation
pub type QueryResult<T> = Result<T, QueryError>;

/// Query compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed filter triple
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Missing or unusable keyspace/table name
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

impl QueryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidFilter(_) => "INVALID_FILTER",
            QueryError::InvalidTarget(_) => "INVALID_TARGET",
        }
    }

    pub(crate) fn invalid_filter(reason: impl Into<String>) -> Self {
        QueryError::InvalidFilter(reason.into())
    }

    pub(crate) fn invalid_target(reason: impl Into<String>) -> Self {
        QueryError::InvalidTarget(reason.into())
    }
}
