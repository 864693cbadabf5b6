//! Request and result types at the executor boundary

use serde_json::{Map, Value};

use crate::cursor::PageToken;

/// One row: column name to value
pub type Row = Map<String, Value>;

/// A statement ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Statement text, exactly as compiled
    pub statement: String,
    /// Continuation to resume from, if not the first page
    pub page_token: Option<PageToken>,
    /// Fetch size
    pub page_size: u32,
}

impl ExecutionRequest {
    pub fn new(statement: impl Into<String>, page_token: Option<PageToken>, page_size: u32) -> Self {
        Self {
            statement: statement.into(),
            page_token,
            page_size,
        }
    }
}

/// One page returned by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Rows in store order
    pub rows: Vec<Row>,
    /// Continuation for the following page
    pub next_token: Option<PageToken>,
    /// Whether more rows follow
    pub has_more: bool,
}

impl PageResult {
    /// A page with nothing after it
    pub fn last(rows: Vec<Row>) -> Self {
        Self {
            rows,
            next_token: None,
            has_more: false,
        }
    }

    /// A page followed by more rows
    pub fn with_next(rows: Vec<Row>, next: PageToken) -> Self {
        Self {
            rows,
            next_token: Some(next),
            has_more: true,
        }
    }

    pub fn returned_count(&self) -> usize {
        self.rows.len()
    }

    /// Continuation only when the store reported more rows.
    ///
    /// A token without `has_more`, or `has_more` without a token, both mean
    /// there is nothing to advance to.
    pub fn continuation(&self) -> Option<PageToken> {
        if self.has_more {
            self.next_token.clone()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64) -> Row {
        json!({ "id": id }).as_object().cloned().unwrap()
    }

    #[test]
    fn test_last_page() {
        let page = PageResult::last(vec![row(1), row(2)]);
        assert_eq!(page.returned_count(), 2);
        assert!(!page.has_more);
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn test_page_with_next() {
        let token = PageToken::from_bytes(vec![1, 2]);
        let page = PageResult::with_next(vec![row(1)], token.clone());
        assert_eq!(page.continuation(), Some(token));
    }

    #[test]
    fn test_inconsistent_flags_have_no_continuation() {
        let page = PageResult {
            rows: vec![],
            next_token: Some(PageToken::from_bytes(vec![9])),
            has_more: false,
        };
        assert_eq!(page.continuation(), None);
    }
}
