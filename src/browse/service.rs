//! Browse service
//!
//! Wires compilation, dispatch, counting, cursor sessions and envelope
//! assembly together behind the operations the HTTP layer exposes.

use std::sync::Arc;

use chrono::Utc;

use crate::count::{CountEstimate, CountEstimator, CountResult};
use crate::cursor::{CursorError, CursorRegistry, PageToken, ViewKey};
use crate::envelope::{EnvelopeAssembler, ResultEnvelope};
use crate::executor::{dispatch, ExecutionRequest, ExecutorResult, PageResult, StatementExecutor};
use crate::query::{
    CompiledQuery, FilterSpec, QueryCompiler, QueryResult, RawFilter, TableRef, FULL_SCAN_FLAG,
};

use super::config::BrowseConfig;
use super::errors::{BrowseError, BrowseResult};
use super::request::{
    CountRequest, ExecuteRequest, FetchPageRequest, NavAction, NavigateRequest, SessionCreated,
};

/// Browse operations over one statement executor
pub struct BrowseService {
    executor: Arc<dyn StatementExecutor>,
    compiler: QueryCompiler,
    counter: CountEstimator,
    sessions: CursorRegistry,
    config: BrowseConfig,
}

impl BrowseService {
    pub fn new(executor: Arc<dyn StatementExecutor>, config: BrowseConfig) -> Self {
        let compiler = QueryCompiler::new(config.max_result_limit);
        let counter = CountEstimator::new(executor.clone(), compiler, config.count_timeout())
            .with_fallback(config.count_fallback);

        Self {
            executor,
            compiler,
            counter,
            sessions: CursorRegistry::new(config.session_idle()),
            config,
        }
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    pub fn sessions(&self) -> &CursorRegistry {
        &self.sessions
    }

    /// Fetch one page without session state; the caller carries the token.
    pub async fn fetch_page(&self, request: FetchPageRequest) -> BrowseResult<ResultEnvelope> {
        let target = request.target();
        let filter = resolve_filter(request.filter)?;
        let page_size = self.page_size(request.page_size);
        let compiled =
            self.compiler
                .compile_page(&target, filter.as_ref(), page_size, request.allow_filtering)?;
        tracing::debug!(statement = %compiled.statement_text, "statement compiled");

        let (page, count) = self
            .fetch_with_count(
                &compiled,
                request.page_token,
                &target,
                filter.as_ref(),
                request.include_count,
            )
            .await;

        Ok(EnvelopeAssembler::assemble(
            &compiled,
            page?,
            count,
            request.sort.as_ref(),
        ))
    }

    /// Count rows for a table, honoring the filter if one is given.
    pub async fn estimate_count(&self, request: CountRequest) -> BrowseResult<CountEstimate> {
        let target = request.target();
        let filter = resolve_filter(request.filter)?;
        Ok(self.counter.estimate(&target, filter.as_ref()).await?)
    }

    /// Open a cursor session
    pub fn create_session(&self) -> SessionCreated {
        let session_id = self.sessions.create();
        tracing::info!(session = %session_id, "cursor session created");
        SessionCreated {
            session_id,
            created_at: Utc::now(),
        }
    }

    /// Move a session's cursor and return the page it lands on.
    ///
    /// The transition is computed on a copy of the history and committed
    /// only once the page was fetched; a failed or timed-out fetch leaves the
    /// session exactly as it was. A view change restarts at the first page,
    /// except that `previous` on it fails with `NoPriorPage`.
    pub async fn navigate(
        &self,
        session_id: &str,
        request: NavigateRequest,
    ) -> BrowseResult<ResultEnvelope> {
        let mut lease = self.sessions.lease(session_id)?;

        let target = request.target();
        let filter = resolve_filter(request.filter)?;
        let page_size = self.compiler.clamp_page_size(self.page_size(request.page_size));
        let compiled =
            self.compiler
                .compile_page(&target, filter.as_ref(), page_size, request.allow_filtering)?;

        let view = ViewKey {
            target,
            filter,
            page_size,
            allow_filtering: request.allow_filtering,
        };

        // A new view starts from an empty history: previous has nowhere to
        // go, and next lands on the first page.
        let new_view = lease.is_new_view(&view);
        let mut history = lease.history_for(&view);
        if new_view {
            tracing::debug!(session = %session_id, table = %view.target, "view changed, cursor reset");
        }
        match request.action {
            NavAction::First => history.reset(),
            NavAction::Next if new_view => {}
            NavAction::Next => history.advance(lease.next_token_for(&view))?,
            NavAction::Previous => {
                history.retreat()?;
            }
            NavAction::Current => {}
        }

        let (page, count) = self
            .fetch_with_count(
                &compiled,
                history.current().cloned(),
                &view.target,
                view.filter.as_ref(),
                request.include_count,
            )
            .await;
        let page = page?;

        let next_token = page.continuation();
        let envelope = EnvelopeAssembler::assemble(&compiled, page, count, request.sort.as_ref())
            .at_position(&history);

        tracing::info!(
            session = %session_id,
            action = ?request.action,
            page = history.page_number(),
            has_more = envelope.has_more,
            "cursor moved"
        );
        lease.commit(view, history, next_token);

        Ok(envelope)
    }

    /// Drop a session and its history
    pub fn close_session(&self, session_id: &str) -> BrowseResult<()> {
        if self.sessions.remove(session_id) {
            tracing::info!(session = %session_id, "cursor session closed");
            Ok(())
        } else {
            Err(CursorError::UnknownSession(session_id.to_string()).into())
        }
    }

    /// Forward a statement from the query box as written. No count.
    pub async fn execute_raw(&self, request: ExecuteRequest) -> BrowseResult<ResultEnvelope> {
        let page_size = self.compiler.clamp_page_size(self.page_size(request.page_size));
        let compiled = CompiledQuery {
            requires_full_scan: request
                .statement
                .to_ascii_uppercase()
                .contains(FULL_SCAN_FLAG),
            statement_text: request.statement,
            limit: Some(page_size),
        };

        let execution =
            ExecutionRequest::new(&compiled.statement_text, request.page_token, page_size);
        let page = dispatch(self.executor.clone(), execution, self.config.executor_timeout()).await?;

        Ok(EnvelopeAssembler::assemble(&compiled, page, None, None))
    }

    fn page_size(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.config.default_page_size)
    }

    /// Run the row fetch and, if asked, the count side by side. Each has its
    /// own deadline and neither cancels the other.
    async fn fetch_with_count(
        &self,
        compiled: &CompiledQuery,
        token: Option<PageToken>,
        target: &TableRef,
        filter: Option<&FilterSpec>,
        include_count: bool,
    ) -> (ExecutorResult<PageResult>, Option<CountResult<CountEstimate>>) {
        let execution = ExecutionRequest::new(
            &compiled.statement_text,
            token,
            compiled.limit.unwrap_or(self.config.default_page_size),
        );
        let rows = dispatch(self.executor.clone(), execution, self.config.executor_timeout());

        if include_count {
            let (rows, count) = tokio::join!(rows, self.counter.estimate(target, filter));
            if let Err(err) = &count {
                tracing::warn!(table = %target, error = %err, "count unavailable for page");
            }
            (rows, Some(count))
        } else {
            (rows.await, None)
        }
    }
}

fn resolve_filter(raw: Option<RawFilter>) -> QueryResult<Option<FilterSpec>> {
    match raw {
        Some(raw) => raw.into_spec(),
        None => Ok(None),
    }
}
