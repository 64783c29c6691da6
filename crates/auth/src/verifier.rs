//! Credential verification
//!
//! Defines the `CredentialVerifier` trait for turning a raw token into an
//! [`IdentityRef`], and `JwtCredentials`, the HMAC-SHA256 implementation that
//! also mints tokens at login.

use std::time::Duration as StdDuration;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use crate::claims::{MAX_TOKEN_SIZE, TokenClaims};
use crate::error::{AuthError, CredentialFault, Result};
use crate::identity::IdentityRef;

/// Minimum HMAC secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Credential verifier trait
///
/// Verification is a pure function of the token and the key material held by
/// the implementation: no I/O, no clock other than the expiry check.
pub trait CredentialVerifier: Send + Sync {
    /// Validate a raw token and return the identity it names
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` if the token is malformed,
    /// carries a bad signature, or has expired.
    fn verify(&self, token: &str) -> Result<IdentityRef>;

    /// Verifier name for logging/debugging
    fn name(&self) -> &'static str;
}

/// Settings for minting and verifying session tokens
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// HMAC signing secret (at least 32 bytes)
    pub secret: Vec<u8>,
    /// Token time-to-live
    pub ttl: StdDuration,
    /// Issuer claim written into and required from tokens
    pub issuer: Option<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            secret: vec![],
            ttl: StdDuration::from_secs(30 * 24 * 60 * 60), // 30 days
            issuer: None,
        }
    }
}

impl CredentialConfig {
    /// Create a new config with the given secret
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set token TTL
    pub fn with_ttl(mut self, ttl: StdDuration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set issuer
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

/// A freshly minted token
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Encoded JWT
    pub token: String,
    /// Expiry (Unix timestamp)
    pub expires_at: i64,
}

/// HS256 token minting and verification
pub struct JwtCredentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: Option<String>,
}

impl std::fmt::Debug for JwtCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredentials")
            .field("algorithm", &"HS256")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtCredentials {
    /// Build keys from config
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the secret is shorter than 32 bytes or
    /// the TTL does not fit a signed duration.
    pub fn new(config: &CredentialConfig) -> Result<Self> {
        if config.secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "token secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        let ttl = Duration::from_std(config.ttl)
            .map_err(|e| AuthError::Config(format!("invalid token ttl: {}", e)))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            ttl,
            issuer: config.issuer.clone(),
        })
    }

    /// Mint a token for a user
    pub fn mint(&self, user_id: &str) -> Result<IssuedCredential> {
        let claims = TokenClaims::issue(user_id, self.ttl, self.issuer.clone());

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenEncoding(e.to_string()))?;

        Ok(IssuedCredential {
            token,
            expires_at: claims.expires_at,
        })
    }

    /// Token time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims> {
        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("JWT validation failed: {:?}", e);
                let fault = match e.kind() {
                    ErrorKind::ExpiredSignature => CredentialFault::Expired,
                    ErrorKind::ImmatureSignature => CredentialFault::NotYetValid,
                    ErrorKind::InvalidSignature => CredentialFault::BadSignature,
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => CredentialFault::Malformed,
                    _ => CredentialFault::Claims(e.to_string()),
                };
                AuthError::InvalidCredential(fault)
            })?;

        Ok(token_data.claims)
    }
}

impl CredentialVerifier for JwtCredentials {
    fn verify(&self, token: &str) -> Result<IdentityRef> {
        if token.is_empty() || token.len() > MAX_TOKEN_SIZE {
            return Err(AuthError::InvalidCredential(CredentialFault::Malformed));
        }

        let claims = self.decode_claims(token)?;

        if claims.user_id.is_empty() {
            return Err(AuthError::InvalidCredential(CredentialFault::Claims(
                "empty user id".into(),
            )));
        }

        Ok(IdentityRef {
            user_id: claims.user_id,
            expires_at: claims.expires_at,
        })
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}
