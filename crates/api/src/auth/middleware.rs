//! Authentication extractor for Axum
//!
//! # Setup
//!
//! Your app state must implement `HasRequestGate`:
//!
//! ```ignore
//! use taskboard_auth::RequestGate;
//! use taskboard_api::auth::HasRequestGate;
//!
//! struct AppState {
//!     gate: RequestGate,
//! }
//!
//! impl HasRequestGate for AppState {
//!     fn request_gate(&self) -> &RequestGate {
//!         &self.gate
//!     }
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use taskboard_auth::{Identity, RequestGate};

use crate::error::ApiError;

/// Trait for app state that provides a request gate
pub trait HasRequestGate: Send + Sync {
    /// Get the gate
    fn request_gate(&self) -> &RequestGate;
}

/// Authenticated user extractor
///
/// Runs the gate up to the identity stage: the token is extracted and
/// verified and the user is loaded fresh from the store. Authorization for
/// a specific operation happens in the handler, once the target is known.
///
/// # Example
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AuthUser {
    /// Take the identity
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasRequestGate + Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = state.request_gate().authenticate(parts).await?;
        Ok(AuthUser(identity))
    }
}

/// Public paths that don't require authentication
pub fn is_public_path(path: &str) -> bool {
    const PUBLIC_PATHS: [&str; 3] = ["/health", "/api/auth/login", "/api/auth/logout"];

    PUBLIC_PATHS.contains(&path)
}
