//! API error types
//!
//! Provides structured error responses for the HTTP API:
//!
//! ```json
//! { "success": false, "error": "FORBIDDEN", "message": "Not permitted to perform this operation" }
//! ```
//!
//! Auth failures carry generic messages only. The detail goes to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use taskboard_auth::{AuthError, GateRejection, Rejection};

use crate::store::StoreError;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No usable identity
    #[error("authentication required: {0}")]
    Unauthorized(String),

    /// Email/password login failed
    #[error("invalid email or password")]
    InvalidLogin,

    /// Identity known, operation not allowed
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidLogin => "INVALID_CREDENTIALS",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the client
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Not authorized to access this route".to_string(),
            Self::InvalidLogin => "Invalid email or password".to_string(),
            Self::Forbidden(_) => "Not permitted to perform this operation".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    // Helper constructors

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} '{}' not found", entity, id))
    }

    /// Create a validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<GateRejection> for ApiError {
    fn from(rejection: GateRejection) -> Self {
        let detail = rejection.to_string();
        match rejection.rejection() {
            Rejection::Unauthenticated => Self::Unauthorized(detail),
            Rejection::Forbidden => Self::Forbidden(detail),
            Rejection::Internal => Self::Internal(detail),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if matches!(err, AuthError::InvalidLogin) {
            return Self::InvalidLogin;
        }

        let detail = err.to_string();
        match err.rejection() {
            Rejection::Unauthenticated => Self::Unauthorized(detail),
            Rejection::Forbidden => Self::Forbidden(detail),
            Rejection::Internal => Self::Internal(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingParent { kind, id } => Self::not_found(kind.as_str(), &id),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.code(),
            message: self.public_message(),
        };

        tracing::warn!(
            error_code = body.error,
            error_detail = %self,
            status = %status,
            "API error"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_auth::{CredentialFault, DenyReason, GateStage};

    #[test]
    fn test_gate_rejections_map_to_status() {
        let missing = ApiError::from(GateRejection {
            stage: GateStage::Start,
            error: AuthError::MissingCredential,
        });
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

        let denied = ApiError::from(GateRejection {
            stage: GateStage::Authorized,
            error: AuthError::forbidden(DenyReason::NotHolder),
        });
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

        let concealed = ApiError::from(GateRejection {
            stage: GateStage::Authorized,
            error: AuthError::forbidden(DenyReason::NotHolder).concealed(),
        });
        assert_eq!(concealed.status_code(), StatusCode::UNAUTHORIZED);

        let broken = ApiError::from(GateRejection {
            stage: GateStage::IdentityLoaded,
            error: AuthError::store("disk full"),
        });
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_denials_do_not_leak_reason() {
        let not_holder = ApiError::from(AuthError::forbidden(DenyReason::NotHolder));
        let missing = ApiError::from(AuthError::forbidden(DenyReason::ResourceMissing));
        assert_eq!(not_holder.public_message(), missing.public_message());
        assert_eq!(not_holder.code(), missing.code());
    }

    #[test]
    fn test_credential_faults_look_alike() {
        let expired = ApiError::from(AuthError::InvalidCredential(CredentialFault::Expired));
        let orphan = ApiError::from(AuthError::UserNotFound);
        assert_eq!(expired.public_message(), orphan.public_message());
        assert_eq!(expired.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = ApiError::internal("database is locked");
        assert!(!err.public_message().contains("locked"));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_invalid_login() {
        let err = ApiError::from(AuthError::InvalidLogin);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
    }
}
