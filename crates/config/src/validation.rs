//! Configuration validation
//!
//! Two levels:
//! - structural checks run on every parse (ports, names, paths)
//! - serving checks additionally require a usable signing secret

use crate::Config;
use crate::error::{ConfigError, Result};

/// Checks that hold for any command
pub fn validate_structure(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_storage(config)?;
    validate_auth_settings(config)?;
    Ok(())
}

/// Checks required before serving requests
pub fn validate_config(config: &Config) -> Result<()> {
    validate_structure(config)?;
    config.auth.validate()
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.host.trim().is_empty() {
        return Err(ConfigError::missing_field("server", "host"));
    }

    if config.server.port == 0 {
        return Err(ConfigError::invalid_value(
            "server",
            "port",
            "must be non-zero",
        ));
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<()> {
    if config.storage.db_path.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("storage", "db_path"));
    }
    Ok(())
}

fn validate_auth_settings(config: &Config) -> Result<()> {
    let cookie = &config.auth.cookie_name;
    if cookie.trim().is_empty() {
        return Err(ConfigError::missing_field("auth", "cookie_name"));
    }

    // Cookie names are RFC 6265 tokens
    if cookie
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || "()<>@,;:\\\"/[]?={}".contains(c))
    {
        return Err(ConfigError::invalid_value(
            "auth",
            "cookie_name",
            format!("'{}' is not a valid cookie name", cookie),
        ));
    }

    if let Some(ref issuer) = config.auth.issuer
        && issuer.trim().is_empty()
    {
        return Err(ConfigError::invalid_value(
            "auth",
            "issuer",
            "must not be empty when set",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-very-long-secret-key-for-testing";

    #[test]
    fn test_defaults_are_structurally_valid() {
        assert!(validate_structure(&Config::default()).is_ok());
    }

    #[test]
    fn test_defaults_cannot_serve() {
        // No secret configured
        assert!(validate_config(&Config::default()).is_err());
    }

    #[test]
    fn test_serving_config() {
        let mut config = Config::default();
        config.auth.jwt_secret = Some(SECRET.to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_structure(&config).unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_empty_db_path() {
        let mut config = Config::default();
        config.storage.db_path = Default::default();
        assert!(validate_structure(&config).is_err());
    }

    #[test]
    fn test_bad_cookie_name() {
        let mut config = Config::default();
        config.auth.cookie_name = "my token".to_string();
        assert!(validate_structure(&config).is_err());

        config.auth.cookie_name = "a=b".to_string();
        assert!(validate_structure(&config).is_err());
    }

    #[test]
    fn test_empty_issuer() {
        let mut config = Config::default();
        config.auth.issuer = Some(" ".to_string());
        assert!(validate_structure(&config).is_err());
    }
}
