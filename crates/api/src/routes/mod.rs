//! API routes
//!
//! Resource-grouped HTTP route handlers. Every handler except login, logout
//! and health takes an [`AuthUser`](crate::auth::AuthUser) and admits the
//! operation through the gate before touching the tracker store.

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;

use axum::{Router, middleware};

use crate::audit::audit_layer;
use crate::state::AppState;

/// Options for building the router
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Enable audit logging middleware
    pub audit_logging: bool,
}

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    build_router_with_options(state, RouterOptions::default())
}

/// Build the complete API router with options
pub fn build_router_with_options(state: AppState, options: RouterOptions) -> Router {
    let router = Router::new()
        .merge(health::routes())
        .nest("/api/auth", auth::routes())
        .nest("/api/projects", projects::routes())
        .nest("/api/tasks", tasks::routes())
        .nest("/api/comments", comments::routes());

    let router = if options.audit_logging {
        router.layer(middleware::from_fn(audit_layer))
    } else {
        router
    };

    router.with_state(state)
}

/// Reject blank or oversized text fields
pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> crate::error::Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::ApiError::validation(field, "must not be empty"));
    }
    if value.chars().count() > max_len {
        return Err(crate::error::ApiError::validation(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Website", 100).is_ok());
        assert!(require_text("name", "   ", 100).is_err());
        assert!(require_text("name", "abcdef", 5).is_err());
    }
}
