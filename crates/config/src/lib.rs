//! Taskboard Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use taskboard_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\nport = 8080").unwrap();
//! assert_eq!(config.server.port, 8080);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! port = 5000
//!
//! [auth]
//! jwt_secret = "env:JWT_SECRET"
//!
//! [storage]
//! db_path = "data/taskboard.db"
//! ```

mod auth;
mod error;
mod logging;
mod server;
mod storage;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use auth::{AuthConfig, MIN_JWT_SECRET_LENGTH};
pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use server::ServerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server
    pub server: ServerConfig,

    /// Session tokens and credential transport
    pub auth: AuthConfig,

    /// SQLite database
    pub storage: StorageConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        validation::validate_structure(&config)?;
        Ok(config)
    }

    /// Validate the configuration for serving
    ///
    /// Parsing only checks structure. This also requires a resolvable JWT
    /// secret of at least 32 bytes.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.cookie_name, "token");
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 8080

[auth]
jwt_secret = "this-is-a-very-long-secret-key-for-testing"
jwt_expires_in = "7d"
issuer = "tracker"
allow_query_token = true

[storage]
db_path = "/tmp/tracker.db"

[log]
level = "debug"
format = "json"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.auth.jwt_expires_in, Duration::from_secs(7 * 24 * 60 * 60));
        assert!(config.auth.allow_query_token);
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/tracker.db"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_zero_port() {
        assert!(Config::from_str("[server]\nport = 0").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/taskboard.toml");
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }
}
