//! Tracker store
//!
//! Projects, tasks and comments in SQLite. Also the source of ownership
//! facts for the request gate: every lookup reads the current rows.

mod models;

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use thiserror::Error;
use tracing::{debug, info};

use taskboard_auth::{AuthError, OwnershipFact, OwnershipStore, ResourceKind};

pub use models::{
    Comment, CommentPatch, NewComment, NewProject, NewTask, Project, ProjectPatch, Task,
    TaskPatch, TaskPriority, TaskStatus,
};

/// Errors from the tracker store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the database
    #[error("failed to open tracker store: {0}")]
    Open(String),

    /// Query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Referenced parent does not exist
    #[error("{kind} '{id}' not found")]
    MissingParent {
        /// Parent kind
        kind: ResourceKind,
        /// Parent ID
        id: String,
    },

    /// Row holds a value outside the known set
    #[error("corrupt {kind} row '{id}': {message}")]
    Corrupt {
        /// Row kind
        kind: ResourceKind,
        /// Row ID
        id: String,
        /// What was wrong
        message: String,
    },
}

/// Result type for tracker store operations
pub type Result<T> = std::result::Result<T, StoreError>;

const PROJECT_COLUMNS: &str = "id, name, description, created_by, created_at";
const TASK_COLUMNS: &str = "id, title, description, project_id, assigned_to, status, priority, due_date, created_by, created_at";
const COMMENT_COLUMNS: &str = "id, text, task_id, user_id, created_at";

/// SQLite-backed store for projects, tasks and comments
#[derive(Debug, Clone)]
pub struct TrackerStore {
    pool: SqlitePool,
}

impl TrackerStore {
    /// Open or create a tracker store at the given path
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Tracker store opened at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for tests and throwaway servers)
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Open(e.to_string()))?
            .foreign_keys(true);

        // Every connection to ":memory:" is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        for ddl in [
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                assigned_to TEXT,
                status TEXT NOT NULL DEFAULT 'Pending',
                priority TEXT NOT NULL DEFAULT 'Medium',
                due_date TEXT,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id)",
            "CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_to)",
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_comments_task ON comments(task_id)",
        ] {
            sqlx::query(ddl).execute(&self.pool).await?;
        }

        debug!("Tracker store schema initialized");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Projects
    // -------------------------------------------------------------------------

    /// Create a project
    pub async fn create_project(&self, new: &NewProject, created_by: &str) -> Result<Project> {
        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description.clone(),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO projects (id, name, description, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.created_by)
        .bind(project.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(project)
    }

    /// Get a project by ID
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    /// List all projects, newest first
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    /// List projects in which `user_id` has at least one assigned task
    pub async fn list_projects_for(&self, user_id: &str) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROJECT_COLUMNS} FROM projects
            WHERE id IN (SELECT project_id FROM tasks WHERE assigned_to = ?)
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    /// Apply a patch to a project
    ///
    /// Returns None if the project does not exist.
    pub async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<Option<Project>> {
        let Some(mut project) = self.get_project(id).await? else {
            return Ok(None);
        };

        if let Some(ref name) = patch.name {
            project.name = name.trim().to_string();
        }
        if let Some(ref description) = patch.description {
            project.description = description.clone();
        }

        sqlx::query("UPDATE projects SET name = ?, description = ? WHERE id = ?")
            .bind(&project.name)
            .bind(&project.description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(project))
    }

    /// Delete a project with its tasks and their comments
    pub async fn delete_project(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM comments WHERE task_id IN (SELECT id FROM tasks WHERE project_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM tasks WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    /// Create a task
    ///
    /// Fails with `MissingParent` if the project does not exist.
    pub async fn create_task(&self, new: &NewTask, created_by: &str) -> Result<Task> {
        if self.get_project(&new.project_id).await?.is_none() {
            return Err(StoreError::MissingParent {
                kind: ResourceKind::Project,
                id: new.project_id.clone(),
            });
        }

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            description: new.description.clone(),
            project_id: new.project_id.clone(),
            assigned_to: new.assigned_to.clone().filter(|a| !a.is_empty()),
            status: new.status,
            priority: new.priority,
            due_date: new.due_date,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, description, project_id, assigned_to, status, priority, due_date, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.project_id)
        .bind(&task.assigned_to)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date.map(|d| d.to_string()))
        .bind(&task.created_by)
        .bind(task.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(task)
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let row = sqlx::query(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    /// List the tasks of a project, newest first
    pub async fn list_tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    /// Apply a patch to a task
    ///
    /// Returns None if the task does not exist.
    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        let Some(mut task) = self.get_task(id).await? else {
            return Ok(None);
        };

        if let Some(ref title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(ref description) = patch.description {
            task.description = description.clone();
        }
        if let Some(ref assigned_to) = patch.assigned_to {
            // An empty string unassigns
            task.assigned_to = Some(assigned_to.clone()).filter(|a| !a.is_empty());
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, assigned_to = ?, status = ?, priority = ?, due_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assigned_to)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date.map(|d| d.to_string()))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    /// Delete a task with its comments
    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Comments
    // -------------------------------------------------------------------------

    /// Create a comment
    ///
    /// Fails with `MissingParent` if the task does not exist.
    pub async fn create_comment(&self, new: &NewComment, user_id: &str) -> Result<Comment> {
        if self.get_task(&new.task_id).await?.is_none() {
            return Err(StoreError::MissingParent {
                kind: ResourceKind::Task,
                id: new.task_id.clone(),
            });
        }

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            text: new.text.clone(),
            task_id: new.task_id.clone(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO comments (id, text, task_id, user_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.text)
        .bind(&comment.task_id)
        .bind(&comment.user_id)
        .bind(comment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Get a comment by ID
    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(comment_from_row).transpose()
    }

    /// List the comments on a task, oldest first
    pub async fn list_comments_for_task(&self, task_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE task_id = ? ORDER BY created_at ASC"
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(comment_from_row).collect()
    }

    /// Replace the text of a comment
    ///
    /// Returns None if the comment does not exist.
    pub async fn update_comment(&self, id: &str, text: &str) -> Result<Option<Comment>> {
        let Some(mut comment) = self.get_comment(id).await? else {
            return Ok(None);
        };

        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await?;

        comment.text = text.to_string();
        Ok(Some(comment))
    }

    /// Delete a comment
    pub async fn delete_comment(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------------

    /// Build the current ownership fact for a resource
    pub async fn ownership_fact(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<OwnershipFact>> {
        match kind {
            ResourceKind::Project => {
                let Some(project) = self.get_project(id).await? else {
                    return Ok(None);
                };
                let participants: Vec<String> = sqlx::query_scalar(
                    "SELECT DISTINCT assigned_to FROM tasks WHERE project_id = ? AND assigned_to IS NOT NULL",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

                Ok(Some(
                    OwnershipFact::project(project.id, Some(project.created_by))
                        .with_participants(participants),
                ))
            }
            ResourceKind::Task => Ok(self
                .get_task(id)
                .await?
                .map(|t| OwnershipFact::task(t.id, t.project_id, t.assigned_to))),
            ResourceKind::Comment => Ok(self
                .get_comment(id)
                .await?
                .map(|c| OwnershipFact::comment(c.id, c.task_id, Some(c.user_id)))),
        }
    }
}

#[async_trait]
impl OwnershipStore for TrackerStore {
    async fn ownership(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> taskboard_auth::Result<Option<OwnershipFact>> {
        self.ownership_fact(kind, id).await.map_err(AuthError::store)
    }
}

fn parse_timestamp(kind: ResourceKind, id: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            kind,
            id: id.to_string(),
            message: format!("bad timestamp '{}': {}", value, e),
        })
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let id: String = row.try_get("id")?;
    let created_at = parse_timestamp(ResourceKind::Project, &id, row.try_get("created_at")?)?;

    Ok(Project {
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_by: row.try_get("created_by")?,
        created_at,
        id,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let id: String = row.try_get("id")?;
    let corrupt = |message: String| StoreError::Corrupt {
        kind: ResourceKind::Task,
        id: id.clone(),
        message,
    };

    let status_str: String = row.try_get("status")?;
    let status = TaskStatus::parse(&status_str)
        .ok_or_else(|| corrupt(format!("unknown status '{}'", status_str)))?;

    let priority_str: String = row.try_get("priority")?;
    let priority = TaskPriority::parse(&priority_str)
        .ok_or_else(|| corrupt(format!("unknown priority '{}'", priority_str)))?;

    let due_date = row
        .try_get::<Option<String>, _>("due_date")?
        .map(|d| {
            d.parse::<NaiveDate>()
                .map_err(|e| corrupt(format!("bad due date '{}': {}", d, e)))
        })
        .transpose()?;

    let created_at = parse_timestamp(ResourceKind::Task, &id, row.try_get("created_at")?)?;

    Ok(Task {
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        project_id: row.try_get("project_id")?,
        assigned_to: row.try_get("assigned_to")?,
        status,
        priority,
        due_date,
        created_by: row.try_get("created_by")?,
        created_at,
        id,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let id: String = row.try_get("id")?;
    let created_at = parse_timestamp(ResourceKind::Comment, &id, row.try_get("created_at")?)?;

    Ok(Comment {
        text: row.try_get("text")?,
        task_id: row.try_get("task_id")?,
        user_id: row.try_get("user_id")?,
        created_at,
        id,
    })
}
