//! Login service
//!
//! Checks email and password against the user store and mints a session
//! token. Verification of that token on later requests happens in the gate.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::identity::Identity;
use crate::user_store_trait::UserStore;
use crate::verifier::JwtCredentials;

/// Authentication response with token and user info
#[derive(Debug, Clone)]
pub struct AuthResponse {
    /// Signed session token
    pub token: String,
    /// Authenticated user
    pub identity: Identity,
    /// When the token expires (Unix timestamp)
    pub expires_at: i64,
}

/// Email/password login
///
/// # Example
///
/// ```ignore
/// let store = LocalUserStore::open("taskboard.db").await?;
/// let credentials = JwtCredentials::new(&CredentialConfig::new(secret))?;
/// let auth = AuthService::new(Arc::new(store), Arc::new(credentials));
///
/// let response = auth.login("user@example.com", "password").await?;
/// ```
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    credentials: Arc<JwtCredentials>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    /// Create a new auth service
    pub fn new(store: Arc<dyn UserStore>, credentials: Arc<JwtCredentials>) -> Self {
        Self { store, credentials }
    }

    /// Login with email and password
    ///
    /// An unknown email and a wrong password both yield
    /// `AuthError::InvalidLogin`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidLogin);
        }

        let Some(user) = self.store.verify_credentials(email, password).await? else {
            debug!(email = %email, "login failed");
            return Err(AuthError::InvalidLogin);
        };

        let issued = self.credentials.mint(&user.id)?;

        info!(user_id = %user.id, email = %user.email, "User logged in");

        Ok(AuthResponse {
            token: issued.token,
            identity: user.to_identity(),
            expires_at: issued.expires_at,
        })
    }

    /// Token minter
    pub fn credentials(&self) -> &Arc<JwtCredentials> {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use crate::test_utils::TEST_SECRET;
    use crate::user_store::LocalUserStore;
    use crate::verifier::{CredentialConfig, CredentialVerifier};

    async fn service() -> AuthService {
        let store = LocalUserStore::in_memory().await.unwrap();
        store
            .create_user("Ada", "ada@example.com", "correct horse", Role::Member)
            .await
            .unwrap();
        let credentials = JwtCredentials::new(&CredentialConfig::new(TEST_SECRET)).unwrap();
        AuthService::new(Arc::new(store), Arc::new(credentials))
    }

    #[tokio::test]
    async fn test_login_mints_verifiable_token() {
        let auth = service().await;
        let response = auth.login("ada@example.com", "correct horse").await.unwrap();

        assert_eq!(response.identity.email, "ada@example.com");
        assert_eq!(response.identity.role, Role::Member);

        let reference = auth.credentials().verify(&response.token).unwrap();
        assert_eq!(reference.user_id, response.identity.id);
        assert_eq!(reference.expires_at, response.expires_at);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let auth = service().await;

        let wrong_password = auth.login("ada@example.com", "nope").await.unwrap_err();
        let unknown_email = auth.login("bob@example.com", "nope").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidLogin));
        assert!(matches!(unknown_email, AuthError::InvalidLogin));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let auth = service().await;
        assert!(matches!(
            auth.login("", "pw").await,
            Err(AuthError::InvalidLogin)
        ));
        assert!(matches!(
            auth.login("ada@example.com", "").await,
            Err(AuthError::InvalidLogin)
        ));
    }
}
