//! JWT token claims
//!
//! Defines the structure of the session tokens minted at login.
//! The role is deliberately absent: it is read from the user store on every
//! request.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted token size (8KB)
pub const MAX_TOKEN_SIZE: usize = 8 * 1024;

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    #[serde(rename = "id")]
    pub user_id: String,

    // Standard JWT claims
    /// Subject (user ID)
    #[serde(rename = "sub", skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Issued at (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Not before (Unix timestamp)
    #[serde(rename = "nbf", skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,

    /// Issuer
    #[serde(rename = "iss", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// JWT ID
    #[serde(rename = "jti", skip_serializing_if = "Option::is_none")]
    pub jwt_id: Option<String>,
}

impl TokenClaims {
    /// Claims for a token issued now and valid for `ttl`
    pub fn issue(user_id: impl Into<String>, ttl: Duration, issuer: Option<String>) -> Self {
        let user_id = user_id.into();
        let now = Utc::now();

        Self {
            subject: Some(user_id.clone()),
            user_id,
            expires_at: (now + ttl).timestamp(),
            issued_at: now.timestamp(),
            not_before: Some(now.timestamp()),
            issuer,
            jwt_id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}
