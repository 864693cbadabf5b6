//! Row count estimation
//!
//! Without a filter the count comes from store-maintained size statistics:
//! fast, possibly stale, never scans table data. With a filter it comes from
//! a scoped `COUNT(*)` that honors the predicate and may scan the table.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::{dispatch, ExecutionRequest, PageResult, StatementExecutor};
use crate::query::{CompiledQuery, FilterSpec, QueryCompiler, TableRef};

use super::errors::{CountError, CountResult};

/// Fetch size for the size-statistics lookup (one row per token range)
const SIZE_ESTIMATE_FETCH: u32 = 5000;

/// A row count and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEstimate {
    pub value: u64,
    /// `true` when counted by a scoped query, `false` for size statistics
    pub exact: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CountEstimate {
    pub fn approximate(value: u64) -> Self {
        Self {
            value,
            exact: false,
            warning: None,
        }
    }

    pub fn exact(value: u64, warning: impl Into<String>) -> Self {
        Self {
            value,
            exact: true,
            warning: Some(warning.into()),
        }
    }
}

/// Resolves counts for browse requests
#[derive(Clone)]
pub struct CountEstimator {
    executor: Arc<dyn StatementExecutor>,
    compiler: QueryCompiler,
    timeout: Duration,
    fallback: bool,
}

impl CountEstimator {
    pub fn new(executor: Arc<dyn StatementExecutor>, compiler: QueryCompiler, timeout: Duration) -> Self {
        Self {
            executor,
            compiler,
            timeout,
            fallback: false,
        }
    }

    /// Fall back to a full `COUNT(*)` when size statistics cannot be read
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub async fn estimate(&self, target: &TableRef, filter: Option<&FilterSpec>) -> CountResult<CountEstimate> {
        match filter {
            Some(filter) => {
                let compiled = self.compiler.compile_count(target, Some(filter), true)?;
                let value = self.scoped_count(&compiled).await?;
                Ok(CountEstimate::exact(
                    value,
                    format!("counted with a full scan of {}", target),
                ))
            }
            None => self.size_estimate(target).await,
        }
    }

    async fn size_estimate(&self, target: &TableRef) -> CountResult<CountEstimate> {
        let compiled = self.compiler.compile_size_estimate(target)?;

        match self.sum_size_estimates(&compiled).await {
            Ok(value) => Ok(CountEstimate::approximate(value)),
            Err(reason) if self.fallback => {
                tracing::warn!(table = %target, reason = %reason, "size estimates unavailable, counting with a full scan");
                let compiled = self.compiler.compile_count(target, None, true)?;
                let value = self.scoped_count(&compiled).await?;
                Ok(CountEstimate::exact(
                    value,
                    format!("size estimates unavailable ({}); counted with a full scan of {}", reason, target),
                ))
            }
            Err(reason) => Err(CountError::unavailable(reason)),
        }
    }

    /// Sum `partitions_count` over every token-range row, following
    /// continuations until the store reports the last page.
    async fn sum_size_estimates(&self, compiled: &CompiledQuery) -> Result<u64, String> {
        let mut total = 0u64;
        let mut token = None;

        loop {
            let request = ExecutionRequest::new(&compiled.statement_text, token, SIZE_ESTIMATE_FETCH);
            let page = dispatch(self.executor.clone(), request, self.timeout)
                .await
                .map_err(|e| e.to_string())?;
            total = total.saturating_add(sum_partitions(&page)?);

            match page.continuation() {
                Some(next) => token = Some(next),
                None => return Ok(total),
            }
        }
    }

    async fn scoped_count(&self, compiled: &CompiledQuery) -> CountResult<u64> {
        let request = ExecutionRequest::new(&compiled.statement_text, None, 1);
        let page = dispatch(self.executor.clone(), request, self.timeout).await?;

        page.rows
            .first()
            .and_then(|row| row.get("count").or_else(|| row.values().next()))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                CountError::unavailable(format!(
                    "count result has no numeric column: {}",
                    compiled.statement_text
                ))
            })
    }
}

/// Sum `partitions_count` over the token-range rows of one page
fn sum_partitions(page: &PageResult) -> Result<u64, String> {
    page.rows.iter().try_fold(0u64, |total, row| {
        row.get("partitions_count")
            .and_then(Value::as_u64)
            .map(|n| total.saturating_add(n))
            .ok_or_else(|| "size estimate row without partitions_count".to_string())
    })
}
