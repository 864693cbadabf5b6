//! Cursor management for paged browsing
//!
//! The store issues forward-only continuation tokens. This module keeps the
//! per-session history needed to offer "previous page" on top of them.
//!
//! # Invariants
//!
//! - Tokens are opaque and never cross sessions
//! - The top of the history reproduces the page before the current one
//! - A view change (table, filter, page size, full-scan opt-in) resets it
//! - At most one navigation per session is in flight

mod errors;
mod history;
mod registry;
mod token;

pub use errors::{CursorError, CursorResult};
pub use history::{CursorHistory, CursorState};
pub use registry::{CursorLease, CursorRegistry, CursorSession, ViewKey};
pub use token::PageToken;
