//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server and database sections. Every section defaults to the values the
//! application has always shipped with, so a completely empty `{}` file (or
//! no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }
        if self.server.request_timeout_secs == 0 {
            warnings.push(
                "server.request_timeout_secs is 0; a 1 second timeout will be used".into(),
            );
        }
        if self.database.path.as_os_str().is_empty() {
            warnings.push("database.path is empty".into());
        }
        if self.database.pool_size == 0 {
            warnings.push("database.pool_size is 0; a pool of 1 will be used".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Selects the verbose log filter when `RUST_LOG` is unset.
    pub debug: bool,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Per-request deadline, never shorter than one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            debug: true,
            request_timeout_secs: 30,
        }
    }
}

/// SQLite storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inneapp.db"),
            pool_size: 4,
            busy_timeout_ms: 5000,
            connection_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_shipped_values() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert!(cfg.server.debug);
        assert_eq!(cfg.database.path, PathBuf::from("inneapp.db"));
        assert_eq!(cfg.database.pool_size, 4);
    }

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn zero_pool_size_warns() {
        let mut cfg = Config::default();
        cfg.database.pool_size = 0;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("pool_size")));
    }

    #[test]
    fn zero_request_timeout_is_clamped() {
        let mut cfg = Config::default();
        assert_eq!(cfg.server.request_timeout(), Duration::from_secs(30));

        cfg.server.request_timeout_secs = 0;
        assert_eq!(cfg.server.request_timeout(), Duration::from_secs(1));
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.contains("request_timeout_secs") && w.contains("1 second")));
    }

    #[test]
    fn empty_db_path_warns() {
        let mut cfg = Config::default();
        cfg.database.path = PathBuf::new();
        assert!(cfg.validate().iter().any(|w| w.contains("database.path")));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"server": {"port": 9090}, "database": {"path": "/tmp/x.db"}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.database.path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_or_default_with_none() {
        let cfg = Config::load_or_default(None);
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/inneapp.json")));
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inneapp.json");
        std::fs::write(&path, r#"{"server": {"debug": false}}"#).unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert!(!cfg.server.debug);
    }
}
