//! Statement execution boundary
//!
//! The browsing layer hands compiled statements to a [`StatementExecutor`]
//! and gets back one page of rows plus an opaque continuation.
//!
//! # Execution Flow
//!
//! 1. Build an [`ExecutionRequest`] from the compiled statement
//! 2. [`dispatch`] it on the blocking pool under the caller's deadline
//! 3. Return the page, or the store's rejection with the statement verbatim
//!
//! [`MemoryStore`] is the executor the service ships with.

mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod filters;
mod memory;
mod result;
mod statement;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::{dispatch, StatementExecutor};
pub use filters::{matches_like_pattern, ConditionFilter};
pub use memory::{MemoryStore, SeedTable};
pub use result::{ExecutionRequest, PageResult, Row};
pub use statement::{
    parse_condition, parse_select, Comparison, Condition, Literal, Projection, SelectStatement,
};
