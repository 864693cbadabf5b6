//! Service configuration file
//!
//! ```json
//! {
//!   "server":  { "host": "127.0.0.1", "port": 8742, "cors_origins": [],
//!                "max_body_bytes": 65536 },
//!   "browse":  { "max_result_limit": 1000, "default_page_size": 100,
//!                "executor_timeout_ms": 10000, "count_timeout_ms": 10000,
//!                "count_fallback": false, "session_idle_secs": 1800 },
//!   "logging": { "filter": "info", "json": false },
//!   "seed_path": "./seed.json"
//! }
//! ```
//!
//! Every section and field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::browse::BrowseConfig;
use crate::observability::LoggingConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Where the console API listens and who may call it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins of the console UI; empty allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body. Bounds ad-hoc statements and filter values.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8742
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("server.max_body_bytes must be positive".to_string());
        }
        if let Some(bad) = self
            .cors_origins
            .iter()
            .find(|o| o.parse::<axum::http::HeaderValue>().is_err())
        {
            return Err(format!("server.cors_origins has an invalid origin '{}'", bad));
        }
        Ok(())
    }
}

/// Whole-service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub browse: BrowseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Seed tables for the in-memory store
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl ConsoleConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: ConsoleConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        // Relative seed paths are relative to the config file
        if let (Some(seed), Some(dir)) = (config.seed_path.as_ref(), path.parent()) {
            if seed.is_relative() {
                config.seed_path = Some(dir.join(seed));
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(ConfigError::Invalid)?;
        self.browse.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_is_default() {
        let file = write_config("{}");
        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn test_sections_override_defaults() {
        let file = write_config(
            r#"{"server": {"port": 9100}, "browse": {"count_fallback": true}, "logging": {"json": true}}"#,
        );
        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert!(config.browse.count_fallback);
        assert_eq!(config.browse.default_page_size, 100);
        assert!(config.logging.json);
    }

    #[test]
    fn test_relative_seed_path_resolved_against_config_dir() {
        let file = write_config(r#"{"seed_path": "seed.json"}"#);
        let config = ConsoleConfig::load(file.path()).unwrap();
        let dir = file.path().parent().unwrap();
        assert_eq!(config.seed_path, Some(dir.join("seed.json")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config(r#"{"browse": {"executor_timeout_ms": 0}}"#);
        assert!(matches!(
            ConsoleConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_server_section() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr(), "127.0.0.1:8742");
        assert_eq!(config.max_body_bytes, 64 * 1024);

        let file = write_config(r#"{"server": {"host": " "}}"#);
        assert!(matches!(
            ConsoleConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let file = write_config(r#"{"server": {"cors_origins": ["http://ok:1", "bad\norigin"]}}"#);
        assert!(matches!(
            ConsoleConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let file = write_config("{ nope");
        assert!(matches!(
            ConsoleConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ConsoleConfig::load(Path::new("/nonexistent/keyspace-browser.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
