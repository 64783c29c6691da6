//! Authentication routes
//!
//! Login mints a session token and sets it as an HttpOnly cookie. The same
//! token is returned in the body for clients that send a bearer header.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use taskboard_auth::{AuthError, Identity};

use crate::audit::AuditAction;
use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ApiResponse, Empty};
use crate::{audit, audit_fail};

/// Auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
    pub expires_at: i64,
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let response = match state.auth.login(&req.email, &req.password).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, AuthError::InvalidLogin) {
                audit_fail!(AuditAction::LoginFailure, "invalid_credentials", email = %req.email);
            }
            return Err(e.into());
        }
    };

    audit!(AuditAction::LoginSuccess, user_id = %response.identity.id);

    let cookie = session_cookie(
        &state.session.cookie_name,
        &response.token,
        state.session_max_age().as_secs(),
    )?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::new(LoginResponse {
            token: response.token,
            user: response.identity,
            expires_at: response.expires_at,
        })),
    ))
}

/// POST /api/auth/logout
///
/// Expires the session cookie. Tokens are stateless, so a copy kept by the
/// client stays valid until its own expiry.
async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse> {
    audit!(AuditAction::Logout, "session cookie cleared");

    let cookie = session_cookie(&state.session.cookie_name, "none", 0)?;
    Ok(([(SET_COOKIE, cookie)], Json(ApiResponse::new(Empty {}))))
}

/// GET /api/auth/me
async fn me(user: AuthUser) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::new(user.into_inner()))
}

fn session_cookie(name: &str, value: &str, max_age_secs: u64) -> Result<HeaderValue> {
    let cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    HeaderValue::from_str(&cookie).map_err(|e| ApiError::internal(format!("bad cookie: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token", "abc.def.ghi", 3600).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("token=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_cleared_cookie_expires_now() {
        let cookie = session_cookie("token", "none", 0).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }
}
