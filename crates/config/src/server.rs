//! HTTP server configuration

use serde::Deserialize;

/// HTTP server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// host = "127.0.0.1"   # default
/// port = 5000          # default
/// audit_logging = false # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    /// Default: "127.0.0.1"
    pub host: String,

    /// Port to listen on
    /// Default: 5000
    pub port: u16,

    /// Emit `audit` target events for every request
    /// Default: false
    pub audit_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            audit_logging: false,
        }
    }
}

impl ServerConfig {
    /// `host:port` form accepted by `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
