//! Taskboard - Authentication
//!
//! Credential verification, identity loading and access policy.
//!
//! # Overview
//!
//! Two roles, one policy table:
//!
//! | Role | Capabilities |
//! |------|--------------|
//! | `Member` | Work on assigned tasks, comment, see projects they take part in |
//! | `Admin` | Everything |
//!
//! # Request flow
//!
//! ```text
//! request ─► ExtractionChain ─► CredentialVerifier ─► IdentityLoader ─► authorize ─► handler
//!             cookie/bearer/query    signature, expiry    live role         policy table
//! ```
//!
//! [`RequestGate`] runs those stages in order. Tokens carry only the user ID;
//! the role is read from the [`UserStore`] on every request, so promotions,
//! demotions and deletions take effect immediately.

mod claims;
mod error;
mod extract;
mod gate;
mod identity;
mod ownership;
pub mod password;
mod policy;
mod roles;
mod service;
mod user_store;
mod user_store_trait;
mod verifier;

/// Test utilities for generating JWT tokens
pub mod test_utils;

pub use claims::{MAX_TOKEN_SIZE, TokenClaims};
pub use error::{AuthError, CredentialFault, Rejection, Result};
pub use extract::{CredentialSource, DEFAULT_TOKEN_NAME, ExtractionChain};
pub use gate::{Admission, GateRejection, GateStage, RequestGate, Target};
pub use identity::{Identity, IdentityLoader, IdentityRef};
pub use ownership::{OwnershipFact, OwnershipStore, ResourceKind};
pub use policy::{Decision, DenyReason, Operation, Rule, authorize, rule};
pub use roles::Role;
pub use service::{AuthResponse, AuthService};
pub use user_store::{LocalUserStore, StoredUser};
pub use user_store_trait::UserStore;
pub use verifier::{
    CredentialConfig, CredentialVerifier, IssuedCredential, JwtCredentials, MIN_SECRET_LENGTH,
};
