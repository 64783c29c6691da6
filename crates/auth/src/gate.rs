//! Request gate
//!
//! The single choke point between an incoming request and resource logic:
//!
//! ```text
//! Start -> CredentialExtracted -> Verified -> IdentityLoaded -> Authorized -> Admitted
//! ```
//!
//! Any stage may reject. A rejection records the last stage reached and no
//! later stage runs.

use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use thiserror::Error;
use tracing::{debug, trace};

use crate::error::{AuthError, Rejection};
use crate::extract::ExtractionChain;
use crate::identity::{Identity, IdentityLoader};
use crate::ownership::{OwnershipFact, OwnershipStore};
use crate::policy::{Decision, Operation, Rule, authorize, rule};
use crate::user_store_trait::UserStore;
use crate::verifier::CredentialVerifier;

/// Progress of a request through the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStage {
    /// Nothing done yet
    Start,
    /// A token was found
    CredentialExtracted,
    /// Token signature and expiry checked
    Verified,
    /// Live identity loaded from the user store
    IdentityLoaded,
    /// Policy evaluated
    Authorized,
    /// Request may proceed
    Admitted,
}

impl GateStage {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CredentialExtracted => "credential_extracted",
            Self::Verified => "verified",
            Self::IdentityLoaded => "identity_loaded",
            Self::Authorized => "authorized",
            Self::Admitted => "admitted",
        }
    }
}

impl fmt::Display for GateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the operation is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// No specific resource (create, list)
    Unscoped,
    /// A resource by ID
    Resource(String),
    /// A resource whose existence must not be revealed on denial
    SensitiveResource(String),
}

impl Target {
    fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Unscoped => None,
            Self::Resource(id) | Self::SensitiveResource(id) => Some(id),
        }
    }
}

/// A request that passed every stage
#[derive(Debug, Clone)]
pub struct Admission {
    /// Authenticated caller
    pub identity: Identity,
    /// Operation that was checked
    pub operation: Operation,
    /// Always `Decision::Allow`
    pub decision: Decision,
}

/// A request stopped by the gate
#[derive(Debug, Error)]
#[error("rejected after {stage}: {error}")]
pub struct GateRejection {
    /// Last stage reached
    pub stage: GateStage,
    /// Why
    #[source]
    pub error: AuthError,
}

impl GateRejection {
    /// Externally visible class
    pub fn rejection(&self) -> Rejection {
        self.error.rejection()
    }
}

fn reject(stage: GateStage, error: AuthError) -> GateRejection {
    debug!(stage = %stage, error = %error, "request rejected");
    GateRejection { stage, error }
}

/// Composes extraction, verification, identity loading and policy
#[derive(Clone)]
pub struct RequestGate {
    chain: ExtractionChain,
    verifier: Arc<dyn CredentialVerifier>,
    loader: IdentityLoader,
    resources: Arc<dyn OwnershipStore>,
}

impl fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGate")
            .field("sources", &self.chain.sources())
            .field("verifier", &self.verifier.name())
            .finish_non_exhaustive()
    }
}

impl RequestGate {
    /// Create a gate
    pub fn new(
        chain: ExtractionChain,
        verifier: Arc<dyn CredentialVerifier>,
        users: Arc<dyn UserStore>,
        resources: Arc<dyn OwnershipStore>,
    ) -> Self {
        Self {
            chain,
            verifier,
            loader: IdentityLoader::new(users),
            resources,
        }
    }

    /// Run every stage for one operation
    pub async fn admit(
        &self,
        parts: &Parts,
        operation: Operation,
        target: Target,
    ) -> Result<Admission, GateRejection> {
        let identity = self.authenticate(parts).await?;
        self.authorize(identity, operation, target).await
    }

    /// Stages up to `IdentityLoaded`
    pub async fn authenticate(&self, parts: &Parts) -> Result<Identity, GateRejection> {
        let (source, token) = self
            .chain
            .extract(parts)
            .ok_or_else(|| reject(GateStage::Start, AuthError::MissingCredential))?;
        trace!(source = %source, "credential extracted");

        let reference = self
            .verifier
            .verify(&token)
            .map_err(|e| reject(GateStage::CredentialExtracted, e))?;

        let identity = self
            .loader
            .load(&reference)
            .await
            .map_err(|e| reject(GateStage::Verified, e))?;
        trace!(user_id = %identity.id, role = %identity.role, "identity loaded");

        Ok(identity)
    }

    /// Remaining stages for an already authenticated identity
    ///
    /// The ownership fact is fetched fresh, and only when the rule for this
    /// role needs one.
    pub async fn authorize(
        &self,
        identity: Identity,
        operation: Operation,
        target: Target,
    ) -> Result<Admission, GateRejection> {
        let needs_fact = matches!(
            rule(operation, identity.role),
            Rule::RequireHolder | Rule::RequireParticipant
        );

        let fact = match target.resource_id() {
            Some(id) if needs_fact => self.lookup(operation, id).await?,
            _ => None,
        };

        let decision = authorize(&identity, operation, fact.as_ref());

        match decision {
            Decision::Allow => {
                trace!(
                    user_id = %identity.id,
                    operation = %operation,
                    stage = %GateStage::Admitted,
                    "request admitted"
                );
                Ok(Admission {
                    identity,
                    operation,
                    decision,
                })
            }
            Decision::Deny(reason) => {
                debug!(
                    user_id = %identity.id,
                    operation = %operation,
                    reason = %reason,
                    "policy denied"
                );
                let error = AuthError::forbidden(reason);
                let error = match target {
                    Target::SensitiveResource(_) => error.concealed(),
                    _ => error,
                };
                Err(reject(GateStage::Authorized, error))
            }
        }
    }

    async fn lookup(
        &self,
        operation: Operation,
        id: &str,
    ) -> Result<Option<OwnershipFact>, GateRejection> {
        self.resources
            .ownership(operation.resource_kind(), id)
            .await
            .map_err(|e| reject(GateStage::IdentityLoaded, e))
    }
}
