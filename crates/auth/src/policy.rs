//! Access policy
//!
//! Every guarded operation is looked up in one table, [`rule`], which maps
//! `(Operation, Role)` to a [`Rule`]. [`authorize`] evaluates that rule
//! against the ownership fact supplied by the resource layer.
//!
//! # Policy
//!
//! | Operation | Admin | Member |
//! |-----------|-------|--------|
//! | create/update/delete project | allow | deny |
//! | list projects | allow | allow (filtered) |
//! | read project, list its tasks | allow | participant |
//! | create task | allow | deny |
//! | read/update/update status/delete task, list its comments | allow | assignee |
//! | create comment | allow | allow |
//! | update/delete comment | allow | author |
//!
//! Admins are never checked against ownership. For members, a missing fact
//! or a fact of the wrong kind denies.

use std::fmt;

use serde::Serialize;

use crate::identity::Identity;
use crate::ownership::{OwnershipFact, ResourceKind};
use crate::roles::Role;

/// Guarded operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a project
    CreateProject,
    /// Read one project
    ReadProject,
    /// List projects visible to the caller
    ListProjects,
    /// Update project fields
    UpdateProject,
    /// Delete a project
    DeleteProject,
    /// List the tasks of a project
    ListProjectTasks,
    /// Create a task
    CreateTask,
    /// Read one task
    ReadTask,
    /// Update task fields other than (or in addition to) status
    UpdateTask,
    /// Update only the status of a task
    UpdateTaskStatus,
    /// Delete a task
    DeleteTask,
    /// List the comments on a task
    ListTaskComments,
    /// Comment on a task
    CreateComment,
    /// Edit a comment
    UpdateComment,
    /// Delete a comment
    DeleteComment,
}

impl Operation {
    /// All operations, for exhaustive checks
    pub const ALL: [Operation; 15] = [
        Self::CreateProject,
        Self::ReadProject,
        Self::ListProjects,
        Self::UpdateProject,
        Self::DeleteProject,
        Self::ListProjectTasks,
        Self::CreateTask,
        Self::ReadTask,
        Self::UpdateTask,
        Self::UpdateTaskStatus,
        Self::DeleteTask,
        Self::ListTaskComments,
        Self::CreateComment,
        Self::UpdateComment,
        Self::DeleteComment,
    ];

    /// Kind of resource whose ownership fact this operation is checked against
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            Self::CreateProject
            | Self::ReadProject
            | Self::ListProjects
            | Self::UpdateProject
            | Self::DeleteProject
            | Self::ListProjectTasks => ResourceKind::Project,
            Self::CreateTask
            | Self::ReadTask
            | Self::UpdateTask
            | Self::UpdateTaskStatus
            | Self::DeleteTask
            | Self::ListTaskComments => ResourceKind::Task,
            Self::CreateComment | Self::UpdateComment | Self::DeleteComment => {
                ResourceKind::Comment
            }
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProject => "create_project",
            Self::ReadProject => "read_project",
            Self::ListProjects => "list_projects",
            Self::UpdateProject => "update_project",
            Self::DeleteProject => "delete_project",
            Self::ListProjectTasks => "list_project_tasks",
            Self::CreateTask => "create_task",
            Self::ReadTask => "read_task",
            Self::UpdateTask => "update_task",
            Self::UpdateTaskStatus => "update_task_status",
            Self::DeleteTask => "delete_task",
            Self::ListTaskComments => "list_task_comments",
            Self::CreateComment => "create_comment",
            Self::UpdateComment => "update_comment",
            Self::DeleteComment => "delete_comment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a role needs in order to perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Always allowed
    Allow,
    /// Never allowed
    Deny,
    /// Caller must be the fact's holder (assignee, author)
    RequireHolder,
    /// Caller must be among the fact's participants
    RequireParticipant,
}

/// Why an operation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Role may never perform this operation
    RoleNotPermitted,
    /// Caller does not hold (or participate in) the resource
    NotHolder,
    /// No ownership fact: the resource does not exist
    ResourceMissing,
    /// Fact supplied for a different kind of resource
    KindMismatch,
}

impl DenyReason {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleNotPermitted => "role_not_permitted",
            Self::NotHolder => "not_holder",
            Self::ResourceMissing => "resource_missing",
            Self::KindMismatch => "kind_mismatch",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Operation may proceed
    Allow,
    /// Operation must not proceed
    Deny(DenyReason),
}

impl Decision {
    /// Check if the decision allows the operation
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// The policy table
pub fn rule(operation: Operation, role: Role) -> Rule {
    use Operation::*;

    match (operation, role) {
        (_, Role::Admin) => Rule::Allow,

        (CreateProject | UpdateProject | DeleteProject | CreateTask, Role::Member) => Rule::Deny,
        (ListProjects | CreateComment, Role::Member) => Rule::Allow,
        (ReadProject | ListProjectTasks, Role::Member) => Rule::RequireParticipant,
        (
            ReadTask | UpdateTask | UpdateTaskStatus | DeleteTask | ListTaskComments,
            Role::Member,
        ) => Rule::RequireHolder,
        (UpdateComment | DeleteComment, Role::Member) => Rule::RequireHolder,
    }
}

/// Decide whether `identity` may perform `operation`
///
/// `fact` is the ownership fact of the target resource, or None when the
/// operation is unscoped or the resource does not exist.
pub fn authorize(
    identity: &Identity,
    operation: Operation,
    fact: Option<&OwnershipFact>,
) -> Decision {
    match rule(operation, identity.role) {
        Rule::Allow => Decision::Allow,
        Rule::Deny => Decision::Deny(DenyReason::RoleNotPermitted),
        Rule::RequireHolder => check_fact(operation, fact, |f| f.is_held_by(&identity.id)),
        Rule::RequireParticipant => {
            check_fact(operation, fact, |f| f.has_participant(&identity.id))
        }
    }
}

fn check_fact(
    operation: Operation,
    fact: Option<&OwnershipFact>,
    predicate: impl FnOnce(&OwnershipFact) -> bool,
) -> Decision {
    let Some(fact) = fact else {
        return Decision::Deny(DenyReason::ResourceMissing);
    };

    if fact.kind != operation.resource_kind() {
        return Decision::Deny(DenyReason::KindMismatch);
    }

    if predicate(fact) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::NotHolder)
    }
}
