//! Result envelope assembly

use serde::{Deserialize, Serialize};

use crate::count::{CountError, CountEstimate};
use crate::cursor::{CursorHistory, PageToken};
use crate::executor::{PageResult, Row};
use crate::query::CompiledQuery;

use super::sorter::{RowSorter, SortSpec};

/// Why the count is missing from an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountFailure {
    pub code: String,
    pub message: String,
}

impl From<&CountError> for CountFailure {
    fn from(err: &CountError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// One page as returned to the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub rows: Vec<Row>,
    pub page_size: u32,
    pub has_more: bool,
    pub next_token: Option<PageToken>,
    pub returned_count: usize,
    pub estimate: Option<CountEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_error: Option<CountFailure>,
    /// Statement exactly as sent to the store
    pub statement_text: String,
    pub requires_full_scan: bool,
    /// 1-based position, for session navigation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_previous: Option<bool>,
}

impl ResultEnvelope {
    /// Record the cursor position the page was reached at
    pub fn at_position(mut self, history: &CursorHistory) -> Self {
        self.page_number = Some(history.page_number());
        self.has_previous = Some(history.has_previous());
        self
    }
}

/// Builds envelopes from executor output
pub struct EnvelopeAssembler;

impl EnvelopeAssembler {
    /// Compose one envelope. Rows are sorted first when `sort` is given.
    ///
    /// `count` is `None` when no count was requested; a failed count leaves
    /// the rows intact and is reported in `count_error`.
    pub fn assemble(
        compiled: &CompiledQuery,
        page: PageResult,
        count: Option<Result<CountEstimate, CountError>>,
        sort: Option<&SortSpec>,
    ) -> ResultEnvelope {
        let next_token = page.continuation();
        let mut rows = page.rows;

        if let Some(spec) = sort {
            RowSorter::sort(&mut rows, spec);
        }

        let (estimate, count_error) = match count {
            Some(Ok(estimate)) => (Some(estimate), None),
            Some(Err(err)) => (None, Some(CountFailure::from(&err))),
            None => (None, None),
        };

        ResultEnvelope {
            returned_count: rows.len(),
            page_size: compiled.limit.unwrap_or(rows.len() as u32),
            has_more: next_token.is_some(),
            next_token,
            rows,
            estimate,
            count_error,
            statement_text: compiled.statement_text.clone(),
            requires_full_scan: compiled.requires_full_scan,
            page_number: None,
            has_previous: None,
        }
    }
}
