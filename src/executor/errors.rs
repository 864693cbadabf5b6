//! Executor error types
//!
//! Error codes:
//! - REJECTED_STATEMENT: the store refused the statement (carries it verbatim)
//! - EXECUTOR_TIMEOUT: no answer within the caller's deadline
//! - EXECUTOR_UNAVAILABLE: the store could not be reached
//!
//! None of these are retried by this layer; retrying a full scan on the
//! caller's behalf could multiply load on the store.

use std::time::Duration;

use thiserror::Error;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Executor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// Store refused the statement
    #[error("Statement rejected: {reason}")]
    RejectedStatement { statement: String, reason: String },

    /// Deadline exceeded
    #[error("Executor timed out after {timeout_ms} ms")]
    Timeout { statement: String, timeout_ms: u64 },

    /// Store unreachable or executor task failed
    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

impl ExecutorError {
    /// Create a rejection for `statement`
    pub fn rejected(statement: impl Into<String>, reason: impl Into<String>) -> Self {
        ExecutorError::RejectedStatement {
            statement: statement.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout for `statement`
    pub fn timeout(statement: impl Into<String>, after: Duration) -> Self {
        ExecutorError::Timeout {
            statement: statement.into(),
            timeout_ms: after.as_millis() as u64,
        }
    }

    /// Create an unavailability error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ExecutorError::Unavailable(reason.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::RejectedStatement { .. } => "REJECTED_STATEMENT",
            ExecutorError::Timeout { .. } => "EXECUTOR_TIMEOUT",
            ExecutorError::Unavailable(_) => "EXECUTOR_UNAVAILABLE",
        }
    }

    /// Statement the error relates to, if known
    pub fn statement(&self) -> Option<&str> {
        match self {
            ExecutorError::RejectedStatement { statement, .. }
            | ExecutorError::Timeout { statement, .. } => Some(statement),
            ExecutorError::Unavailable(_) => None,
        }
    }
}
