//! Browse operations
//!
//! Each operation follows the same path:
//!
//! 1. Validate the filter triple and compile the statement
//! 2. Dispatch it, with the count running alongside when requested
//! 3. Assemble the envelope; for sessions, commit the cursor move last
//!
//! # Invariants
//!
//! - Nothing reaches the executor before the filter validated
//! - A failed fetch never moves a session's cursor
//! - A count failure never hides the rows of a page

mod config;
mod errors;
mod request;
mod service;

pub use config::BrowseConfig;
pub use errors::{BrowseError, BrowseResult, ErrorResponse};
pub use request::{
    CountRequest, ExecuteRequest, FetchPageRequest, NavAction, NavigateRequest, SessionCreated,
};
pub use service::BrowseService;
