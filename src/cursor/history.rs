//! Cursor history state machine
//!
//! The store can only continue forward from a token. Going back is a replay:
//! the history keeps the token that produced every earlier page, and
//! retreating re-issues the query with the token on top of the stack.
//!
//! States:
//! - `AtStart`: empty history, no current token
//! - `AtPage { depth }`: `depth` pages behind the current one
//!
//! Transitions:
//! - `reset`: any state to `AtStart`
//! - `advance(next)`: push current (the start sentinel when on the first
//!   page), current = next
//! - `retreat`: pop into current; `AtStart` once the stack empties

use serde::Serialize;

use super::errors::{CursorError, CursorResult};
use super::token::PageToken;

/// Observable cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CursorState {
    AtStart,
    AtPage { depth: usize },
}

/// Per-session page history.
///
/// `None` entries are the "first page" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorHistory {
    history: Vec<Option<PageToken>>,
    current: Option<PageToken>,
}

impl CursorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next fetch is the first page.
    pub fn reset(&mut self) {
        self.history.clear();
        self.current = None;
    }

    /// Move to the page identified by `next`, the continuation reported by
    /// the page currently shown.
    pub fn advance(&mut self, next: Option<PageToken>) -> CursorResult<()> {
        let next = next.ok_or(CursorError::NoMorePages)?;
        let previous = self.current.replace(next);
        self.history.push(previous);
        Ok(())
    }

    /// Move back one page, returning the token that reproduces it.
    pub fn retreat(&mut self) -> CursorResult<Option<&PageToken>> {
        let previous = self.history.pop().ok_or(CursorError::NoPriorPage)?;
        self.current = previous;
        Ok(self.current.as_ref())
    }

    /// Token to bind when fetching the current page
    pub fn current(&self) -> Option<&PageToken> {
        self.current.as_ref()
    }

    /// Number of pages before the current one
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// One-based page number
    pub fn page_number(&self) -> usize {
        self.depth() + 1
    }

    pub fn has_previous(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn state(&self) -> CursorState {
        if self.history.is_empty() {
            CursorState::AtStart
        } else {
            CursorState::AtPage {
                depth: self.history.len(),
            }
        }
    }
}
