//! Identities and the identity loader
//!
//! A verified token only says *who* claims to be calling. The loader turns
//! that claim into a live [`Identity`] by reading the user store, so role
//! changes and deletions apply on the very next request.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::roles::Role;
use crate::user_store_trait::UserStore;

/// Identity claimed by a verified credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRef {
    /// User ID from the token
    pub user_id: String,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

/// Authenticated user, loaded fresh for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Current role
    pub role: Role,
}

impl Identity {
    /// Create an identity with the given role
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            role,
        }
    }

    /// Check if this identity is an admin
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Loads identities from the user store
#[derive(Clone)]
pub struct IdentityLoader {
    store: Arc<dyn UserStore>,
}

impl std::fmt::Debug for IdentityLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityLoader").finish_non_exhaustive()
    }
}

impl IdentityLoader {
    /// Create a loader over a user store
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Load the current identity for a verified reference
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the user was deleted after the token was issued
    /// - `Store` if the lookup itself failed
    pub async fn load(&self, identity: &IdentityRef) -> Result<Identity> {
        let user = self
            .store
            .get_by_id(&identity.user_id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %identity.user_id, "token names unknown user");
                AuthError::UserNotFound
            })?;

        Ok(user.to_identity())
    }
}
