//! keyspace-browser - query compilation and cursor pagination for a
//! wide-column store admin console
//!
//! Request path, leaf first:
//!
//! - [`query`]: filter validation, value quoting, statement compilation
//! - [`executor`]: the store boundary and the in-memory store
//! - [`cursor`]: per-session page history over forward-only tokens
//! - [`count`]: size-estimate or scoped row counts
//! - [`envelope`]: page sorting and response assembly
//! - [`browse`]: the operations, wired together
//! - [`http_server`], [`cli`]: outer surfaces

pub mod browse;
pub mod cli;
pub mod config;
pub mod count;
pub mod cursor;
pub mod envelope;
pub mod executor;
pub mod http_server;
pub mod observability;
pub mod query;
