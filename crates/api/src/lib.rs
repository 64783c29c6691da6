//! Taskboard API
//!
//! HTTP API for the task tracker, built on Axum.
//!
//! Every guarded route runs through the same [`RequestGate`]: the credential
//! is pulled from the cookie, bearer header or (if enabled) query string,
//! verified, resolved to a live user, and the requested operation is checked
//! against the role policy and the current ownership of the target row.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskboard_api::{AppState, SessionSettings, TrackerStore, build_router};
//! use taskboard_auth::{CredentialConfig, JwtCredentials, LocalUserStore};
//!
//! let users = Arc::new(LocalUserStore::open("data/taskboard.db").await?);
//! let tracker = Arc::new(TrackerStore::open("data/taskboard.db").await?);
//! let credentials = Arc::new(JwtCredentials::new(&CredentialConfig::new(secret))?);
//!
//! let state = AppState::new(users, tracker, credentials, SessionSettings::default());
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/auth/login` - Mint a session token and set the cookie
//! - `POST /api/auth/logout` - Clear the cookie
//! - `GET /api/auth/me` - Current user
//!
//! ## Projects
//! - `GET /api/projects`, `POST /api/projects`
//! - `GET|PUT|DELETE /api/projects/{id}`
//! - `GET /api/projects/{id}/tasks`
//!
//! ## Tasks
//! - `POST /api/tasks`
//! - `GET|PUT|DELETE /api/tasks/{id}`
//! - `GET /api/tasks/{id}/comments`
//!
//! ## Comments
//! - `POST /api/comments`
//! - `PUT|DELETE /api/comments/{id}`
//!
//! [`RequestGate`]: taskboard_auth::RequestGate

pub mod audit;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;

// Re-exports
pub use audit::{AuditAction, audit_layer};
pub use auth::{AuthUser, HasRequestGate, Operation, Role, Target, is_public_path};
pub use error::{ApiError, Result};
pub use routes::{RouterOptions, build_router, build_router_with_options};
pub use state::{AppState, SessionSettings};
pub use store::{StoreError, TrackerStore};
pub use types::{ApiResponse, Empty, ListResponse};
