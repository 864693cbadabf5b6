//! Observability
//!
//! Logging goes through `tracing`. The service emits events at its
//! boundaries: statement compiled, cursor moved, count fallback, executor
//! timeout, request failed. HTTP requests are traced by the router layer.

mod logging;

pub use logging::{env_filter, init_logging, LoggingConfig, LoggingError};
