//! Authentication configuration
//!
//! Session token signing and credential transport settings.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Minimum accepted secret length in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authentication configuration
///
/// # Example
///
/// ```toml
/// [auth]
/// jwt_secret = "env:JWT_SECRET"   # or a literal of at least 32 characters
/// jwt_expires_in = "30d"
/// issuer = "taskboard"
/// allow_query_token = false
/// cookie_name = "token"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret for signing tokens
    /// Either a literal or `env:VAR_NAME`
    pub jwt_secret: Option<String>,

    /// JWT token expiration time
    /// Default: 30 days
    #[serde(with = "humantime_serde")]
    pub jwt_expires_in: Duration,

    /// Issuer claim written into and required from tokens
    /// Default: "taskboard"
    pub issuer: Option<String>,

    /// Accept `?token=` in the query string
    /// Default: false
    pub allow_query_token: bool,

    /// Name of the session cookie
    /// Default: "token"
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expires_in: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            issuer: Some("taskboard".to_string()),
            allow_query_token: false,
            cookie_name: "token".to_string(),
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME`
    ///
    /// # Errors
    ///
    /// Returns error if the secret is not configured, or names an
    /// environment variable that is unset or empty.
    pub fn resolve_jwt_secret(&self) -> Result<String> {
        let value = self
            .jwt_secret
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::missing_field("auth", "jwt_secret"))?;

        let Some(var_name) = value.strip_prefix("env:") else {
            return Ok(value.to_string());
        };

        match std::env::var(var_name) {
            Ok(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(ConfigError::MissingEnvVar {
                name: var_name.to_string(),
                section: "auth",
                field: "jwt_secret",
            }),
        }
    }

    /// Validate the configuration
    ///
    /// Resolves the secret, so an `env:` reference must be set by now.
    pub fn validate(&self) -> Result<()> {
        let secret = self.resolve_jwt_secret()?;
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::invalid_value(
                "auth",
                "jwt_secret",
                format!("must be at least {} characters", MIN_JWT_SECRET_LENGTH),
            ));
        }

        if self.jwt_expires_in.is_zero() {
            return Err(ConfigError::invalid_value(
                "auth",
                "jwt_expires_in",
                "must be greater than zero",
            ));
        }

        if self.cookie_name.trim().is_empty() {
            return Err(ConfigError::missing_field("auth", "cookie_name"));
        }

        Ok(())
    }
}
