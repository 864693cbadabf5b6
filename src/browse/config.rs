//! Browse Configuration
//!
//! Page limits, executor deadlines and cursor session lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_MAX_RESULT_LIMIT;

/// Browsing behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Ceiling for one page (default: 1000)
    #[serde(default = "default_max_result_limit")]
    pub max_result_limit: u32,

    /// Page size when the request names none (default: 100)
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Deadline for a row fetch (default: 10s)
    #[serde(default = "default_executor_timeout_ms")]
    pub executor_timeout_ms: u64,

    /// Deadline for a count, independent of the row fetch (default: 10s)
    #[serde(default = "default_count_timeout_ms")]
    pub count_timeout_ms: u64,

    /// Run a full `COUNT(*)` when size estimates cannot be read (default: false)
    #[serde(default)]
    pub count_fallback: bool,

    /// Idle period after which a cursor session is dropped (default: 30 min)
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_max_result_limit() -> u32 {
    DEFAULT_MAX_RESULT_LIMIT
}

fn default_page_size() -> u32 {
    100
}

fn default_executor_timeout_ms() -> u64 {
    10_000
}

fn default_count_timeout_ms() -> u64 {
    10_000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            max_result_limit: default_max_result_limit(),
            default_page_size: default_page_size(),
            executor_timeout_ms: default_executor_timeout_ms(),
            count_timeout_ms: default_count_timeout_ms(),
            count_fallback: false,
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl BrowseConfig {
    pub fn executor_timeout(&self) -> Duration {
        Duration::from_millis(self.executor_timeout_ms)
    }

    pub fn count_timeout(&self) -> Duration {
        Duration::from_millis(self.count_timeout_ms)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Check value ranges; returns the first problem found
    pub fn validate(&self) -> Result<(), String> {
        if self.max_result_limit == 0 {
            return Err("browse.max_result_limit must be > 0".to_string());
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_result_limit {
            return Err(format!(
                "browse.default_page_size must be in 1..={}",
                self.max_result_limit
            ));
        }
        if self.executor_timeout_ms == 0 {
            return Err("browse.executor_timeout_ms must be > 0".to_string());
        }
        if self.count_timeout_ms == 0 {
            return Err("browse.count_timeout_ms must be > 0".to_string());
        }
        Ok(())
    }
}
