//! Resource ownership facts
//!
//! The resource layer answers "who holds resource X" per request. Facts are
//! read-only input to the policy and are never cached.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of guarded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Project
    Project,
    /// Task within a project
    Task,
    /// Comment on a task
    Comment,
}

impl ResourceKind {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who holds a resource, as reported by the resource store
///
/// `holder` is the project creator, the task assignee or the comment author.
/// `participants` is only meaningful for projects: the assignees of its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipFact {
    /// Resource kind
    pub kind: ResourceKind,
    /// Resource ID
    pub resource_id: String,
    /// Owner, assignee or author (None if not yet set)
    pub holder: Option<String>,
    /// Project of a task, task of a comment
    pub parent_id: Option<String>,
    /// Users with an assigned task in this project
    pub participants: Vec<String>,
}

impl OwnershipFact {
    /// Fact for a project created by `creator`
    pub fn project(id: impl Into<String>, creator: Option<String>) -> Self {
        Self {
            kind: ResourceKind::Project,
            resource_id: id.into(),
            holder: creator,
            parent_id: None,
            participants: Vec::new(),
        }
    }

    /// Fact for a task in `project_id` assigned to `assignee`
    pub fn task(
        id: impl Into<String>,
        project_id: impl Into<String>,
        assignee: Option<String>,
    ) -> Self {
        Self {
            kind: ResourceKind::Task,
            resource_id: id.into(),
            holder: assignee,
            parent_id: Some(project_id.into()),
            participants: Vec::new(),
        }
    }

    /// Fact for a comment on `task_id` written by `author`
    pub fn comment(
        id: impl Into<String>,
        task_id: impl Into<String>,
        author: Option<String>,
    ) -> Self {
        Self {
            kind: ResourceKind::Comment,
            resource_id: id.into(),
            holder: author,
            parent_id: Some(task_id.into()),
            participants: Vec::new(),
        }
    }

    /// Attach project participants
    pub fn with_participants(mut self, participants: Vec<String>) -> Self {
        self.participants = participants;
        self
    }

    /// Check if `user_id` is the holder
    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.holder.as_deref() == Some(user_id)
    }

    /// Check if `user_id` participates in this resource
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }
}

/// Source of ownership facts
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    /// Look up the ownership fact for a resource
    ///
    /// Returns None if the resource does not exist.
    async fn ownership(&self, kind: ResourceKind, id: &str) -> Result<Option<OwnershipFact>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fact() {
        let fact = OwnershipFact::task("t1", "p1", Some("alice".into()));
        assert_eq!(fact.kind, ResourceKind::Task);
        assert_eq!(fact.parent_id.as_deref(), Some("p1"));
        assert!(fact.is_held_by("alice"));
        assert!(!fact.is_held_by("bob"));
    }

    #[test]
    fn test_unassigned_task_is_held_by_nobody() {
        let fact = OwnershipFact::task("t1", "p1", None);
        assert!(!fact.is_held_by(""));
        assert!(!fact.is_held_by("alice"));
    }

    #[test]
    fn test_project_participants() {
        let fact = OwnershipFact::project("p1", Some("admin".into()))
            .with_participants(vec!["alice".into(), "bob".into()]);
        assert!(fact.has_participant("bob"));
        assert!(!fact.has_participant("carol"));
        assert!(fact.is_held_by("admin"));
    }
}
