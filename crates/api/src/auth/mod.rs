//! Authentication and authorization module
//!
//! Two roles, one policy table (see `taskboard_auth::rule`).
//!
//! # Usage
//!
//! ```ignore
//! use taskboard_api::auth::AuthUser;
//! use taskboard_auth::{Operation, Target};
//!
//! async fn delete_task(
//!     user: AuthUser,
//!     Path(id): Path<String>,
//!     State(state): State<AppState>,
//! ) -> Result<StatusCode, ApiError> {
//!     // Authenticated by the extractor, authorized against the live task here
//!     state.admit(user.into_inner(), Operation::DeleteTask, Target::Resource(id.clone())).await?;
//!     ...
//! }
//! ```

pub mod middleware;

pub use middleware::{AuthUser, HasRequestGate, is_public_path};

// Re-export core types from taskboard-auth
pub use taskboard_auth::{Identity, Operation, Role, Target};
