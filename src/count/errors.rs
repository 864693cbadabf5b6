//! Count estimation errors
//!
//! Error codes:
//! - COUNT_UNAVAILABLE: size statistics could not be read and no fallback is configured
//! - query and executor errors keep their own codes

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::query::QueryError;

/// Result type for count operations
pub type CountResult<T> = Result<T, CountError>;

/// Count errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    /// Size-estimate lookup failed without fallback
    #[error("Count unavailable: {0}")]
    CountUnavailable(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    /// Scoped count statement failed
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl CountError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CountError::CountUnavailable(reason.into())
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CountError::CountUnavailable(_) => "COUNT_UNAVAILABLE",
            CountError::Query(err) => err.code(),
            CountError::Executor(err) => err.code(),
        }
    }
}
