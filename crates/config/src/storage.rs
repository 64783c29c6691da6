//! Storage configuration

use std::path::PathBuf;

use serde::Deserialize;

/// SQLite storage configuration
///
/// Users, projects, tasks and comments live in one database file.
///
/// # Example
///
/// ```toml
/// [storage]
/// db_path = "data/taskboard.db"   # default
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database
    /// Default: "data/taskboard.db"
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/taskboard.db"),
        }
    }
}
