//! Query compilation for browse requests
//!
//! Turns a filter triple, a target table and paging parameters into
//! statement text the store will accept.
//!
//! # Rules
//!
//! - Every value and identifier is rendered by `value`; nothing else
//!   interpolates user text into a statement.
//! - Any filter implies the full-scan flag.
//! - Sorting is never compiled; it is applied to the retrieved page.

mod compiler;
mod errors;
mod filter;
pub mod value;

pub use compiler::{
    CompiledQuery, QueryCompiler, TableRef, DEFAULT_MAX_RESULT_LIMIT, FULL_SCAN_FLAG,
    SIZE_ESTIMATES_TABLE,
};
pub use errors::{QueryError, QueryResult};
pub use filter::{FilterSpec, Operator, Predicate, RawFilter};
pub use value::ValueClass;
