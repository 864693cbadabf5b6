//! Row count estimation for browse requests
//!
//! # Policy
//!
//! - No filter: size statistics, `exact = false`
//! - Filter: scoped count with the full-scan flag, `exact = true`, warned
//! - Statistics unreadable: `CountUnavailable`, or a full count when the
//!   fallback is enabled

mod errors;
mod estimator;

pub use errors::{CountError, CountResult};
pub use estimator::{CountEstimate, CountEstimator};
