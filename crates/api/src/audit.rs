//! Audit logging
//!
//! Security-relevant events go to the `audit` tracing target:
//!
//! - Login success and failure
//! - Creation, modification and deletion of projects, tasks and comments
//! - Requests that ended in a client or server error
//!
//! # Example log entry
//!
//! ```json
//! {
//!   "level": "INFO",
//!   "target": "audit",
//!   "action": "task.delete",
//!   "user_id": "0b6f...",
//!   "resource_id": "9c1e...",
//!   "span": { "method": "DELETE", "path": "/api/tasks/9c1e...", "client_ip": "10.0.0.7" }
//! }
//! ```

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, warn};

use crate::auth::is_public_path;

/// Audit event action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    // Auth
    LoginSuccess,
    LoginFailure,
    Logout,

    // Projects
    ProjectCreate,
    ProjectUpdate,
    ProjectDelete,

    // Tasks
    TaskCreate,
    TaskUpdate,
    TaskStatusChange,
    TaskDelete,

    // Comments
    CommentCreate,
    CommentUpdate,
    CommentDelete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "auth.login.success",
            Self::LoginFailure => "auth.login.failure",
            Self::Logout => "auth.logout",
            Self::ProjectCreate => "project.create",
            Self::ProjectUpdate => "project.update",
            Self::ProjectDelete => "project.delete",
            Self::TaskCreate => "task.create",
            Self::TaskUpdate => "task.update",
            Self::TaskStatusChange => "task.status",
            Self::TaskDelete => "task.delete",
            Self::CommentCreate => "comment.create",
            Self::CommentUpdate => "comment.update",
            Self::CommentDelete => "comment.delete",
        }
    }
}

/// Log an audit event (call from handlers for business-level events)
#[macro_export]
macro_rules! audit {
    ($action:expr, $($field:tt)*) => {
        tracing::info!(
            target: "audit",
            action = $action.as_str(),
            $($field)*
        )
    };
}

/// Log a failed audit event
#[macro_export]
macro_rules! audit_fail {
    ($action:expr, $reason:expr, $($field:tt)*) => {
        tracing::warn!(
            target: "audit",
            action = $action.as_str(),
            status = "failure",
            reason = $reason,
            $($field)*
        )
    };
}

/// Middleware that adds audit context to all requests
///
/// Wraps the request in a span with method, path and client IP (from
/// `X-Forwarded-For` or `X-Real-IP`). Handlers log events with `audit!`.
pub async fn audit_layer(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = client_ip(&request);

    let span = tracing::info_span!(
        target: "audit",
        "request",
        method = %method,
        path = %path,
        client_ip = %client_ip,
        public = is_public_path(&path),
    );

    async move {
        let response = next.run(request).await;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!(
                target: "audit",
                status = %status.as_u16(),
                "request_completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}

fn client_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_strings() {
        assert_eq!(AuditAction::LoginSuccess.as_str(), "auth.login.success");
        assert_eq!(AuditAction::TaskStatusChange.as_str(), "task.status");
        assert_eq!(AuditAction::CommentDelete.as_str(), "comment.delete");
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "10.0.0.7, 172.16.0.1")
            .header("x-real-ip", "192.168.1.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "10.0.0.7");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }
}
