//! Statement executor boundary
//!
//! The store is reached through a synchronous call. Dispatch moves that call
//! onto the blocking pool and bounds it with the caller's deadline, so the
//! async request path never blocks on network I/O.

use std::sync::Arc;
use std::time::Duration;

use super::errors::{ExecutorError, ExecutorResult};
use super::result::{ExecutionRequest, PageResult};

/// Executes statements against the store
pub trait StatementExecutor: Send + Sync {
    /// Run one statement, resuming from `request.page_token` if present.
    ///
    /// Rejections must carry `request.statement` verbatim.
    fn execute(&self, request: &ExecutionRequest) -> ExecutorResult<PageResult>;
}

/// Run `request` on the blocking pool, giving up after `timeout`.
///
/// On timeout the blocking call is left to finish in the background and its
/// result is discarded.
pub async fn dispatch(
    executor: Arc<dyn StatementExecutor>,
    request: ExecutionRequest,
    timeout: Duration,
) -> ExecutorResult<PageResult> {
    let statement = request.statement.clone();
    let task = tokio::task::spawn_blocking(move || executor.execute(&request));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ExecutorError::unavailable(format!(
            "executor task failed: {}",
            join_error
        ))),
        Err(_) => {
            tracing::warn!(
                statement = %statement,
                timeout_ms = timeout.as_millis() as u64,
                "executor timed out"
            );
            Err(ExecutorError::timeout(statement, timeout))
        }
    }
}
