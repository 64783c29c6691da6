//! Local user store backed by SQLite

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::error::{AuthError, Result};
use crate::identity::Identity;
use crate::password::{hash_password, verify_password};
use crate::roles::Role;
use crate::user_store_trait::UserStore;

/// Stored user record
#[derive(Debug, Clone)]
pub struct StoredUser {
    /// User ID (UUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Argon2 password hash
    pub password_hash: String,
    /// User's role
    pub role: Role,
    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Convert to the request-scoped identity
    pub fn to_identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Local user store backed by SQLite
#[derive(Debug, Clone)]
pub struct LocalUserStore {
    pool: SqlitePool,
}

impl LocalUserStore {
    /// Open or create a user store at the given path
    ///
    /// Creates the database and tables if they don't exist.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::store(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AuthError::store(format!("failed to open database: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("User store opened at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for tests and throwaway servers)
    pub async fn in_memory() -> Result<Self> {
        // Every connection to ":memory:" is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(":memory:")
            .await
            .map_err(|e| AuthError::store(format!("failed to create memory db: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'member',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::store(format!("failed to create users table: {}", e)))?;

        debug!("User store schema initialized");
        Ok(())
    }

    /// Check if any users exist
    pub async fn is_empty(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::store(format!("failed to count users: {}", e)))?;

        Ok(count == 0)
    }

    /// Create a new user
    ///
    /// Returns error if email already exists.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<StoredUser> {
        let id = uuid::Uuid::new_v4().to_string();
        let password_hash = hash_password(password)?;
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint") {
                AuthError::store(format!("user with email '{}' already exists", email))
            } else {
                AuthError::store(format!("failed to create user: {}", e))
            }
        })?;

        info!("Created user: {} ({})", email, role);

        Ok(StoredUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at,
        })
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, user_id: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::store(format!("failed to get user: {}", e)))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Get user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::store(format!("failed to query user: {}", e)))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Verify email and password, returning user if valid
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<StoredUser>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<StoredUser>> {
        let rows = sqlx::query(
            "SELECT id, name, email, password_hash, role, created_at FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::store(format!("failed to list users: {}", e)))?;

        rows.iter().map(user_from_row).collect()
    }

    /// Update user's role
    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::store(format!("failed to update role: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by ID
    pub async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::store(format!("failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a row to a user, refusing roles outside the closed set
fn user_from_row(row: &SqliteRow) -> Result<StoredUser> {
    let id: String = row.get("id");
    let role_str: String = row.get("role");
    let created_str: String = row.get("created_at");

    let role = Role::parse(&role_str)
        .ok_or_else(|| AuthError::store(format!("user {} has unknown role '{}'", id, role_str)))?;

    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            AuthError::store(format!(
                "user {} has invalid created_at '{}': {}",
                id, created_str, e
            ))
        })?;

    Ok(StoredUser {
        id,
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        created_at,
    })
}

#[async_trait]
impl UserStore for LocalUserStore {
    async fn is_empty(&self) -> Result<bool> {
        LocalUserStore::is_empty(self).await
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<StoredUser> {
        LocalUserStore::create_user(self, name, email, password, role).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredUser>> {
        LocalUserStore::get_by_id(self, id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        LocalUserStore::get_by_email(self, email).await
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<StoredUser>> {
        LocalUserStore::verify_credentials(self, email, password).await
    }

    async fn list_users(&self) -> Result<Vec<StoredUser>> {
        LocalUserStore::list_users(self).await
    }

    async fn set_role(&self, user_id: &str, role: Role) -> Result<bool> {
        LocalUserStore::set_role(self, user_id, role).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        LocalUserStore::delete_user(self, user_id).await
    }
}
