//! Integration tests for the guarded API
//!
//! Drives the full router with real signed tokens and in-memory SQLite
//! stores: authentication failures, login, and who may touch which project,
//! task and comment.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use taskboard_api::{AppState, SessionSettings, TrackerStore, build_router};
use taskboard_auth::test_utils::{self, TEST_SECRET};
use taskboard_auth::{CredentialConfig, JwtCredentials, LocalUserStore, Role, UserStore};

struct Harness {
    app: Router,
    users: Arc<LocalUserStore>,
}

async fn harness() -> Harness {
    let users = Arc::new(LocalUserStore::in_memory().await.unwrap());
    let tracker = Arc::new(TrackerStore::in_memory().await.unwrap());
    let credentials = Arc::new(JwtCredentials::new(&CredentialConfig::new(TEST_SECRET)).unwrap());

    let state = AppState::new(
        Arc::clone(&users) as Arc<dyn UserStore>,
        tracker,
        credentials,
        SessionSettings::default(),
    );

    Harness {
        app: build_router(state),
        users,
    }
}

impl Harness {
    async fn user(&self, name: &str, role: Role) -> (String, String) {
        let user = self
            .users
            .create_user(name, &format!("{name}@example.com"), "password123", role)
            .await
            .unwrap();
        let token = test_utils::mint_test_token(&user.id);
        (user.id, token)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, response_json(response).await)
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(json!({}))
}

fn assert_generic_error(body: &Value, code: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], code);
    assert!(body["message"].is_string());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let h = harness().await;
    let (status, body) = h.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let h = harness().await;
    let (status, body) = h.send(Method::GET, "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_generic_error(&body, "UNAUTHORIZED");
    assert_eq!(body["message"], "Not authorized to access this route");
}

#[tokio::test]
async fn test_forged_and_expired_tokens_are_unauthorized() {
    let h = harness().await;
    let (id, _) = h.user("ada", Role::Admin).await;

    let forged = test_utils::mint_test_token_with_options(
        &id,
        None,
        b"some-other-secret-of-32-bytes!!!",
        chrono::Duration::hours(1),
    );
    let (status, body) = h.send(Method::GET, "/api/auth/me", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_generic_error(&body, "UNAUTHORIZED");

    let expired = test_utils::mint_test_token_with_options(
        &id,
        None,
        TEST_SECRET,
        chrono::Duration::seconds(-60),
    );
    let (status, _) = h.send(Method::GET, "/api/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h
        .send(Method::GET, "/api/auth/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_user_token_stops_working() {
    let h = harness().await;
    let (id, token) = h.user("mia", Role::Member).await;

    let (status, body) = h.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["role"], "member");

    h.users.delete_user(&id).await.unwrap();

    let (status, _) = h.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_cookie_that_authenticates() {
    let h = harness().await;
    h.user("ada", Role::Admin).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": "ada@example.com", "password": "password123"}).to_string(),
        ))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body = response_json(response).await;
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");
    assert!(body["data"]["token"].is_string());

    let session = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, session)
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_login_is_indistinguishable() {
    let h = harness().await;
    h.user("ada", Role::Admin).await;

    let (status, wrong_password) = h
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "nope"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_generic_error(&wrong_password, "INVALID_CREDENTIALS");

    let (status, unknown_email) = h
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "nope"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_member_cannot_manage_projects() {
    let h = harness().await;
    let (_, member) = h.user("mia", Role::Member).await;

    let (status, body) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&member),
            Some(json!({"name": "Website"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_generic_error(&body, "FORBIDDEN");
    assert_eq!(body["message"], "Not permitted to perform this operation");

    let (status, _) = h
        .send(
            Method::POST,
            "/api/tasks",
            Some(&member),
            Some(json!({"title": "Sneaky", "project_id": "p"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_assignee_scenario() {
    let h = harness().await;
    let (_, admin) = h.user("ada", Role::Admin).await;
    let (m_id, m) = h.user("mia", Role::Member).await;
    let (_, n) = h.user("ned", Role::Member).await;

    // Admin sets up a project with one task for M
    let (status, body) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&admin),
            Some(json!({"name": "Website", "description": "Relaunch"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = h
        .send(
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({
                "title": "Landing page",
                "project_id": project_id,
                "assigned_to": m_id,
                "priority": "High"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "Pending");
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    let task_uri = format!("/api/tasks/{task_id}");

    // Project visibility follows assignment
    let (_, body) = h.send(Method::GET, "/api/projects", Some(&m), None).await;
    assert_eq!(body["count"], 1);
    let (_, body) = h.send(Method::GET, "/api/projects", Some(&n), None).await;
    assert_eq!(body["count"], 0);

    let project_uri = format!("/api/projects/{project_id}");
    let (status, _) = h.send(Method::GET, &project_uri, Some(&m), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.send(Method::GET, &project_uri, Some(&n), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .send(Method::GET, &format!("{project_uri}/tasks"), Some(&m), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    // Only the assignee reads and moves the task
    let (status, _) = h.send(Method::GET, &task_uri, Some(&m), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.send(Method::GET, &task_uri, Some(&n), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .send(
            Method::PUT,
            &task_uri,
            Some(&m),
            Some(json!({"status": "In Progress"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "In Progress");

    let (status, _) = h
        .send(Method::PUT, &task_uri, Some(&n), Some(json!({"status": "Done"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Comments: anyone may comment, only the author edits
    let (status, body) = h
        .send(
            Method::POST,
            "/api/comments",
            Some(&m),
            Some(json!({"task_id": task_id, "text": "Started on the hero section"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_uri = format!("/api/comments/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = h
        .send(
            Method::PUT,
            &comment_uri,
            Some(&n),
            Some(json!({"text": "hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = h
        .send(
            Method::PUT,
            &comment_uri,
            Some(&m),
            Some(json!({"text": "Hero section done"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "Hero section done");

    let (status, body) = h
        .send(Method::GET, &format!("{task_uri}/comments"), Some(&m), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    // Members never delete projects; the assignee may delete the task
    let (status, _) = h.send(Method::DELETE, &project_uri, Some(&m), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.send(Method::DELETE, &task_uri, Some(&n), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.send(Method::DELETE, &task_uri, Some(&m), None).await;
    assert_eq!(status, StatusCode::OK);

    // The task and its comments are gone
    let (status, _) = h.send(Method::GET, &task_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.send(Method::DELETE, &comment_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_patch_with_extra_fields_is_not_a_status_update() {
    let h = harness().await;
    let (_, admin) = h.user("ada", Role::Admin).await;
    let (m_id, m) = h.user("mia", Role::Member).await;

    let (_, body) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&admin),
            Some(json!({"name": "Ops"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = h
        .send(
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({"title": "Rotate keys", "project_id": project_id, "assigned_to": m_id})),
        )
        .await;
    let task_uri = format!("/api/tasks/{}", body["data"]["id"].as_str().unwrap());

    // Unknown fields are rejected before anything is written
    let (status, _) = h
        .send(
            Method::PUT,
            &task_uri,
            Some(&m),
            Some(json!({"status": "Done", "project_id": "elsewhere"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = h.send(Method::GET, &task_uri, Some(&m), None).await;
    assert_eq!(body["data"]["status"], "Pending");
}

#[tokio::test]
async fn test_role_change_applies_to_existing_token() {
    let h = harness().await;
    let (id, token) = h.user("mia", Role::Member).await;

    let (status, _) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({"name": "Internal"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    h.users.set_role(&id, Role::Admin).await.unwrap();

    let (status, _) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({"name": "Internal"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_missing_resources() {
    let h = harness().await;
    let (_, admin) = h.user("ada", Role::Admin).await;
    let (_, member) = h.user("mia", Role::Member).await;

    // Admins pass the gate and get the resource layer's answer
    let (status, body) = h
        .send(Method::GET, "/api/tasks/does-not-exist", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_generic_error(&body, "NOT_FOUND");

    let (status, _) = h
        .send(
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({"title": "Orphan", "project_id": "does-not-exist"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Members hold nothing that does not exist
    let (status, _) = h
        .send(Method::GET, "/api/tasks/does-not-exist", Some(&member), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(
            Method::POST,
            "/api/comments",
            Some(&member),
            Some(json!({"task_id": "does-not-exist", "text": "hello"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors() {
    let h = harness().await;
    let (_, admin) = h.user("ada", Role::Admin).await;

    let (status, body) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&admin),
            Some(json!({"name": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_generic_error(&body, "VALIDATION_ERROR");

    let (_, body) = h
        .send(
            Method::POST,
            "/api/projects",
            Some(&admin),
            Some(json!({"name": "Ops"})),
        )
        .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = h
        .send(
            Method::POST,
            "/api/tasks",
            Some(&admin),
            Some(json!({"title": "Ghost work", "project_id": project_id, "assigned_to": "ghost"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
