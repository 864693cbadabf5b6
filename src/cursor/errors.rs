//! # Cursor Errors
//!
//! Navigation misuse. These are caller errors and are never retried.

use thiserror::Error;

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Cursor navigation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Advance requested but the last page reported no continuation
    #[error("No more pages: the current page is the last one")]
    NoMorePages,

    /// Retreat requested on the first page
    #[error("No prior page: already on the first page")]
    NoPriorPage,

    /// Session id not registered, closed, or evicted
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// Another navigation on the same session is still in flight
    #[error("Concurrent cursor mutation on session {0}")]
    ConcurrentCursorMutation(String),
}

impl CursorError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CursorError::NoMorePages => "NO_MORE_PAGES",
            CursorError::NoPriorPage => "NO_PRIOR_PAGE",
            CursorError::UnknownSession(_) => "UNKNOWN_SESSION",
            CursorError::ConcurrentCursorMutation(_) => "CONCURRENT_CURSOR_MUTATION",
        }
    }
}
