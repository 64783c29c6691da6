//! Test utilities for generating JWT tokens
//!
//! These helpers create valid signed JWTs for testing authentication flows.
//! Use these instead of mocking - they test the real validation code path.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use crate::claims::TokenClaims;

/// Test secret for JWT signing (32 bytes for HS256)
pub const TEST_SECRET: &[u8] = b"test-secret-key-32-bytes-long!!!";

/// Create a test token valid for one hour
///
/// # Example
///
/// ```
/// use taskboard_auth::test_utils::{mint_test_token, TEST_SECRET};
/// use taskboard_auth::{CredentialConfig, CredentialVerifier, JwtCredentials};
///
/// let token = mint_test_token("user-1");
/// let verifier = JwtCredentials::new(&CredentialConfig::new(TEST_SECRET)).unwrap();
/// assert_eq!(verifier.verify(&token).unwrap().user_id, "user-1");
/// ```
pub fn mint_test_token(user_id: &str) -> String {
    mint_test_token_with_options(user_id, None, TEST_SECRET, Duration::hours(1))
}

/// Create a test token with full control over all options
///
/// A negative `expires_in` yields an already expired token.
pub fn mint_test_token_with_options(
    user_id: &str,
    issuer: Option<&str>,
    secret: &[u8],
    expires_in: Duration,
) -> String {
    let now = Utc::now();

    let claims = TokenClaims {
        user_id: user_id.to_string(),
        subject: Some(user_id.to_string()),
        expires_at: (now + expires_in).timestamp(),
        issued_at: now.timestamp(),
        not_before: None,
        issuer: issuer.map(String::from),
        jwt_id: None,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("failed to encode test JWT")
}
