//! Project routes
//!
//! Admins manage projects. Members see the projects in which they hold at
//! least one task, and within them only their own tasks.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::audit::AuditAction;
use crate::audit;
use crate::auth::{AuthUser, Operation, Target};
use crate::error::{ApiError, Result};
use crate::routes::require_text;
use crate::state::AppState;
use crate::store::{NewProject, Project, ProjectPatch, Task};
use crate::types::{ApiResponse, Empty, ListResponse};

const MAX_NAME_LEN: usize = 100;

/// Project routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{id}/tasks", get(list_project_tasks))
}

/// GET /api/projects
async fn list_projects(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Project>>> {
    let identity = state
        .admit(user.into_inner(), Operation::ListProjects, Target::Unscoped)
        .await?;

    let projects = if identity.is_admin() {
        state.tracker.list_projects().await?
    } else {
        state.tracker.list_projects_for(&identity.id).await?
    };

    Ok(Json(ListResponse::new(projects)))
}

/// POST /api/projects
async fn create_project(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>)> {
    let identity = state
        .admit(user.into_inner(), Operation::CreateProject, Target::Unscoped)
        .await?;

    require_text("name", &req.name, MAX_NAME_LEN)?;

    let project = state.tracker.create_project(&req, &identity.id).await?;

    audit!(AuditAction::ProjectCreate, user_id = %identity.id, resource_id = %project.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::new(project))))
}

/// GET /api/projects/{id}
async fn get_project(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Project>>> {
    state
        .admit(
            user.into_inner(),
            Operation::ReadProject,
            Target::Resource(id.clone()),
        )
        .await?;

    let project = state
        .tracker
        .get_project(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("project", &id))?;

    Ok(Json(ApiResponse::new(project)))
}

/// PUT /api/projects/{id}
async fn update_project(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<ProjectPatch>,
) -> Result<Json<ApiResponse<Project>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::UpdateProject,
            Target::Resource(id.clone()),
        )
        .await?;

    if let Some(name) = &req.name {
        require_text("name", name, MAX_NAME_LEN)?;
    }

    let project = state
        .tracker
        .update_project(&id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("project", &id))?;

    audit!(AuditAction::ProjectUpdate, user_id = %identity.id, resource_id = %id);

    Ok(Json(ApiResponse::new(project)))
}

/// DELETE /api/projects/{id}
///
/// Removes the project with all of its tasks and their comments.
async fn delete_project(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::DeleteProject,
            Target::Resource(id.clone()),
        )
        .await?;

    if !state.tracker.delete_project(&id).await? {
        return Err(ApiError::not_found("project", &id));
    }

    audit!(AuditAction::ProjectDelete, user_id = %identity.id, resource_id = %id);

    Ok(Json(ApiResponse::new(Empty {})))
}

/// GET /api/projects/{id}/tasks
async fn list_project_tasks(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Task>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::ListProjectTasks,
            Target::Resource(id.clone()),
        )
        .await?;

    if state.tracker.get_project(&id).await?.is_none() {
        return Err(ApiError::not_found("project", &id));
    }

    let mut tasks = state.tracker.list_tasks_for_project(&id).await?;
    if !identity.is_admin() {
        tasks.retain(|t| t.assigned_to.as_deref() == Some(identity.id.as_str()));
    }

    Ok(Json(ListResponse::new(tasks)))
}
