//! # Statement Compiler
//!
//! Builds page, count and size-estimate statements. Compilation is a pure
//! function of its inputs: the same target, filter, page size and full-scan
//! opt-in always produce byte-identical text. Page tokens are never part of
//! the text; they are bound at dispatch time.
//!
//! Ordering is never compiled. The store only honors `ORDER BY` along
//! clustering columns under a partition-key equality, which cannot be
//! guaranteed for an arbitrary column; sorting is applied to the retrieved
//! page instead.

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use super::filter::FilterSpec;
use super::value;

/// Default ceiling for a single page
pub const DEFAULT_MAX_RESULT_LIMIT: u32 = 1000;

/// Explicit opt-in the store requires for predicates it cannot serve by key
pub const FULL_SCAN_FLAG: &str = "ALLOW FILTERING";

/// Table holding the store-maintained size statistics
pub const SIZE_ESTIMATES_TABLE: &str = "system.size_estimates";

/// Keyspace-qualified table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub keyspace: String,
    pub table: String,
}

impl TableRef {
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }

    /// Render as `keyspace.table`
    pub fn qualified(&self) -> QueryResult<String> {
        if self.keyspace.trim().is_empty() {
            return Err(QueryError::invalid_target("keyspace is empty"));
        }
        if self.table.trim().is_empty() {
            return Err(QueryError::invalid_target("table is empty"));
        }
        Ok(format!(
            "{}.{}",
            value::render_identifier(&self.keyspace),
            value::render_identifier(&self.table)
        ))
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

/// A fully rendered statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    /// Literal statement text, kept for audit and display
    pub statement_text: String,

    /// Whether the full-scan flag was appended
    pub requires_full_scan: bool,

    /// Row limit (`None` for aggregate statements)
    pub limit: Option<u32>,
}

/// Compiles browse requests into statements
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler {
    max_result_limit: u32,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULT_LIMIT)
    }
}

impl QueryCompiler {
    /// Create a compiler with the given page ceiling (at least 1)
    pub fn new(max_result_limit: u32) -> Self {
        Self {
            max_result_limit: max_result_limit.max(1),
        }
    }

    pub fn max_result_limit(&self) -> u32 {
        self.max_result_limit
    }

    /// Clamp a requested page size to `[1, max_result_limit]`
    pub fn clamp_page_size(&self, page_size: u32) -> u32 {
        page_size.clamp(1, self.max_result_limit)
    }

    /// Compile the statement for one page of rows.
    ///
    /// Any filter turns the full-scan flag on: key membership of the filtered
    /// column is unknown here, and a missing flag is rejected by the store
    /// while a superfluous one only costs performance.
    pub fn compile_page(
        &self,
        target: &TableRef,
        filter: Option<&FilterSpec>,
        page_size: u32,
        allow_filtering: bool,
    ) -> QueryResult<CompiledQuery> {
        let limit = self.clamp_page_size(page_size);
        let (mut text, requires_full_scan) =
            Self::select_with_predicate("*", target, filter, allow_filtering)?;

        text.push_str(&format!(" LIMIT {}", limit));
        if requires_full_scan {
            text.push(' ');
            text.push_str(FULL_SCAN_FLAG);
        }

        Ok(CompiledQuery {
            statement_text: text,
            requires_full_scan,
            limit: Some(limit),
        })
    }

    /// Compile the count aggregate sharing the page statement's predicate
    /// and flag, without a limit.
    pub fn compile_count(
        &self,
        target: &TableRef,
        filter: Option<&FilterSpec>,
        allow_filtering: bool,
    ) -> QueryResult<CompiledQuery> {
        let (mut text, requires_full_scan) =
            Self::select_with_predicate("COUNT(*)", target, filter, allow_filtering)?;

        if requires_full_scan {
            text.push(' ');
            text.push_str(FULL_SCAN_FLAG);
        }

        Ok(CompiledQuery {
            statement_text: text,
            requires_full_scan,
            limit: None,
        })
    }

    /// Compile the size-statistics lookup for a table
    pub fn compile_size_estimate(&self, target: &TableRef) -> QueryResult<CompiledQuery> {
        // Validates both names even though they are emitted as values here.
        target.qualified()?;

        Ok(CompiledQuery {
            statement_text: format!(
                "SELECT partitions_count FROM {} WHERE keyspace_name = {} AND table_name = {}",
                SIZE_ESTIMATES_TABLE,
                value::quote_text(&target.keyspace),
                value::quote_text(&target.table)
            ),
            requires_full_scan: false,
            limit: None,
        })
    }

    fn select_with_predicate(
        projection: &str,
        target: &TableRef,
        filter: Option<&FilterSpec>,
        allow_filtering: bool,
    ) -> QueryResult<(String, bool)> {
        let mut text = format!("SELECT {} FROM {}", projection, target.qualified()?);
        let mut requires_full_scan = allow_filtering;

        if let Some(filter) = filter {
            let predicate = filter.compile();
            text.push_str(" WHERE ");
            text.push_str(&predicate.fragment);
            requires_full_scan = true;
        }

        Ok((text, requires_full_scan))
    }
}
