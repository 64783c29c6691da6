//! Authentication error types

use std::fmt;

use thiserror::Error;

use crate::policy::DenyReason;

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Why a presented credential was rejected
///
/// Kept for logs only. Callers see a generic "invalid credential" message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialFault {
    /// Not a structurally valid token
    Malformed,
    /// Signature does not match the server secret
    BadSignature,
    /// `exp` is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// Claims failed validation (issuer, missing fields, ...)
    Claims(String),
}

impl fmt::Display for CredentialFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed token"),
            Self::BadSignature => write!(f, "invalid token signature"),
            Self::Expired => write!(f, "token expired"),
            Self::NotYetValid => write!(f, "token not yet valid"),
            Self::Claims(detail) => write!(f, "invalid token claims: {}", detail),
        }
    }
}

/// Errors that can occur during authentication and authorization
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential in any enabled source
    #[error("missing credential")]
    MissingCredential,

    /// Credential present but unusable
    #[error("invalid credential: {0}")]
    InvalidCredential(CredentialFault),

    /// Credential names a user that no longer exists
    #[error("user not found")]
    UserNotFound,

    /// Authenticated, but the policy denied the operation
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Policy outcome
        reason: DenyReason,
        /// Surface as unauthenticated so the target's existence is not revealed
        concealed: bool,
    },

    /// Email/password pair did not match a user
    #[error("invalid email or password")]
    InvalidLogin,

    /// User or resource store failure
    #[error("store error: {0}")]
    Store(String),

    /// Signing keys or settings are unusable
    #[error("auth configuration error: {0}")]
    Config(String),

    /// Failed to sign a new token
    #[error("failed to encode token: {0}")]
    TokenEncoding(String),

    /// Password hashing failed
    #[error("password error: {0}")]
    Password(String),
}

/// Externally visible class of an auth failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 401: no usable identity
    Unauthenticated,
    /// 403: identity known, operation not allowed
    Forbidden,
    /// 500: something broke; never treated as success
    Internal,
}

impl AuthError {
    /// Create a Store error
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a non-concealed Forbidden error
    pub fn forbidden(reason: DenyReason) -> Self {
        Self::Forbidden {
            reason,
            concealed: false,
        }
    }

    /// Classify for the HTTP boundary
    ///
    /// Missing, invalid and orphaned credentials all collapse into
    /// `Unauthenticated` so accounts cannot be enumerated.
    pub fn rejection(&self) -> Rejection {
        match self {
            Self::MissingCredential
            | Self::InvalidCredential(_)
            | Self::UserNotFound
            | Self::InvalidLogin => Rejection::Unauthenticated,
            Self::Forbidden { concealed: true, .. } => Rejection::Unauthenticated,
            Self::Forbidden { .. } => Rejection::Forbidden,
            Self::Store(_) | Self::Config(_) | Self::TokenEncoding(_) | Self::Password(_) => {
                Rejection::Internal
            }
        }
    }

    /// Mark a Forbidden error as existence-sensitive
    ///
    /// Other variants are returned unchanged.
    pub fn concealed(self) -> Self {
        match self {
            Self::Forbidden { reason, .. } => Self::Forbidden {
                reason,
                concealed: true,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_class() {
        assert_eq!(
            AuthError::MissingCredential.rejection(),
            Rejection::Unauthenticated
        );
        assert_eq!(
            AuthError::InvalidCredential(CredentialFault::Expired).rejection(),
            Rejection::Unauthenticated
        );
        assert_eq!(AuthError::UserNotFound.rejection(), Rejection::Unauthenticated);
    }

    #[test]
    fn test_forbidden_class() {
        let err = AuthError::forbidden(DenyReason::NotHolder);
        assert_eq!(err.rejection(), Rejection::Forbidden);
        assert_eq!(err.concealed().rejection(), Rejection::Unauthenticated);
    }

    #[test]
    fn test_concealed_leaves_other_errors() {
        let err = AuthError::store("connection refused").concealed();
        assert_eq!(err.rejection(), Rejection::Internal);
    }

    #[test]
    fn test_store_failure_is_internal() {
        let err = AuthError::store("database is locked");
        assert_eq!(err.rejection(), Rejection::Internal);
        assert!(err.to_string().contains("database is locked"));
    }

    #[test]
    fn test_fault_display() {
        let err = AuthError::InvalidCredential(CredentialFault::Claims("bad iss".into()));
        assert!(err.to_string().contains("bad iss"));
        assert_eq!(CredentialFault::BadSignature.to_string(), "invalid token signature");
    }
}
