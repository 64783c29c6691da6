//! User store trait for abstracting storage backends
//!
//! The identity loader and the login flow only talk to this trait, so the
//! SQLite-backed `LocalUserStore` can be swapped for another backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::roles::Role;

pub use crate::user_store::StoredUser;

/// Abstract user store operations
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Check if any users exist
    async fn is_empty(&self) -> Result<bool>;

    /// Create a new user
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<StoredUser>;

    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredUser>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>>;

    /// Verify credentials and return user if valid
    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<StoredUser>>;

    /// List all users
    async fn list_users(&self) -> Result<Vec<StoredUser>>;

    /// Change a user's role
    async fn set_role(&self, user_id: &str, role: Role) -> Result<bool>;

    /// Delete user by ID
    async fn delete_user(&self, user_id: &str) -> Result<bool>;
}
