//! Logging configuration
//!
//! Controls the logging behavior of the Taskboard server.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - normal operation (default)
    #[default]
    Info,
    /// Warn level - warnings only
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown log level '{}', expected trace, debug, info, warn or error",
                other
            )),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Console,
        }
    }
}

impl LogConfig {
    /// Effective level: an explicit override wins over the file setting
    pub fn effective_level(&self, cli_override: Option<LogLevel>) -> LogLevel {
        cli_override.unwrap_or(self.level)
    }

    /// Default `EnvFilter` directive for the server crates
    ///
    /// Dependencies stay at `warn` unless the level is more verbose.
    pub fn filter_directive(&self, cli_override: Option<LogLevel>) -> String {
        let level = self.effective_level(cli_override);
        let deps = match level {
            LogLevel::Trace | LogLevel::Debug => level.as_str(),
            _ => "warn",
        };
        format!(
            "{deps},taskboard={level},taskboard_api={level},taskboard_auth={level},taskboard_config={level}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "debug"
format = "json"
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" trace ".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_override_wins() {
        let config = LogConfig {
            level: LogLevel::Error,
            ..Default::default()
        };
        assert_eq!(config.effective_level(None), LogLevel::Error);
        assert_eq!(
            config.effective_level(Some(LogLevel::Debug)),
            LogLevel::Debug
        );
    }

    #[test]
    fn test_filter_directive() {
        let config = LogConfig::default();
        let directive = config.filter_directive(None);
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("taskboard_auth=info"));

        let verbose = config.filter_directive(Some(LogLevel::Trace));
        assert!(verbose.starts_with("trace,"));
    }
}
