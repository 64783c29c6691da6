//! Application state
//!
//! Shared state for API handlers: the request gate, the login service and
//! the stores behind them.

use std::sync::Arc;
use std::time::Duration;

use taskboard_auth::{
    AuthService, CredentialSource, CredentialVerifier, DEFAULT_TOKEN_NAME, ExtractionChain,
    Identity, JwtCredentials, Operation, OwnershipStore, RequestGate, Target, UserStore,
};

use crate::auth::HasRequestGate;
use crate::error::ApiError;
use crate::store::TrackerStore;

/// How session tokens travel between client and server
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Cookie set at login and read by the gate
    pub cookie_name: String,
    /// Accept `?token=` on any route
    pub allow_query_token: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_TOKEN_NAME.to_string(),
            allow_query_token: false,
        }
    }
}

impl SessionSettings {
    /// Credential sources in lookup order: cookie, bearer header, query
    pub fn extraction_chain(&self) -> ExtractionChain {
        let mut sources = vec![
            CredentialSource::Cookie(self.cookie_name.clone()),
            CredentialSource::BearerHeader,
        ];
        if self.allow_query_token {
            sources.push(CredentialSource::QueryParam(DEFAULT_TOKEN_NAME.to_string()));
        }
        ExtractionChain::new(sources)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authentication and authorization for every guarded route
    pub gate: Arc<RequestGate>,
    /// Email/password login
    pub auth: Arc<AuthService>,
    /// User accounts
    pub users: Arc<dyn UserStore>,
    /// Projects, tasks and comments
    pub tracker: Arc<TrackerStore>,
    /// Cookie and query settings
    pub session: SessionSettings,
}

impl AppState {
    /// Wire the gate and login service over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        tracker: Arc<TrackerStore>,
        credentials: Arc<JwtCredentials>,
        session: SessionSettings,
    ) -> Self {
        let gate = RequestGate::new(
            session.extraction_chain(),
            Arc::clone(&credentials) as Arc<dyn CredentialVerifier>,
            Arc::clone(&users),
            Arc::clone(&tracker) as Arc<dyn OwnershipStore>,
        );
        let auth = AuthService::new(Arc::clone(&users), credentials);

        Self {
            gate: Arc::new(gate),
            auth: Arc::new(auth),
            users,
            tracker,
            session,
        }
    }

    /// Run the authorization stages for an authenticated caller
    pub async fn admit(
        &self,
        identity: Identity,
        operation: Operation,
        target: Target,
    ) -> Result<Identity, ApiError> {
        let admission = self.gate.authorize(identity, operation, target).await?;
        Ok(admission.identity)
    }

    /// Session cookie lifetime
    pub fn session_max_age(&self) -> Duration {
        self.auth
            .credentials()
            .ttl()
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl HasRequestGate for AppState {
    fn request_gate(&self) -> &RequestGate {
        &self.gate
    }
}
