//! Roles for access control
//!
//! Two roles, closed set:
//!
//! - `Member` - works on assigned tasks, comments
//! - `Admin` - manages projects and tasks

use std::fmt;

use serde::{Deserialize, Serialize};

/// User role in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Assigned tasks and own comments only
    Member,
    /// Everything
    Admin,
}

impl Role {
    /// Parse the stored form of a role
    ///
    /// Only the exact strings written by [`Role::as_str`] are accepted.
    /// Anything else is `None`; callers must not default it to `Member`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Check if this role bypasses ownership checks
    pub fn is_admin(&self) -> bool {
        *self == Self::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
