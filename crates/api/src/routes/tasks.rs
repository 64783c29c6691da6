//! Task routes
//!
//! Admins create and manage every task. Members work on the tasks assigned
//! to them: read, edit, move through statuses, delete and discuss.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::audit;
use crate::audit::AuditAction;
use crate::auth::{AuthUser, Operation, Target};
use crate::error::{ApiError, Result};
use crate::routes::require_text;
use crate::state::AppState;
use crate::store::{Comment, NewTask, Task, TaskPatch};
use crate::types::{ApiResponse, Empty, ListResponse};

const MAX_TITLE_LEN: usize = 200;

/// Task routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_task))
        .route("/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/{id}/comments", get(list_task_comments))
}

/// The operation a patch performs: moving a task through its statuses is
/// granted more widely than editing it.
pub fn update_operation(patch: &TaskPatch) -> Operation {
    if patch.is_status_only() {
        Operation::UpdateTaskStatus
    } else {
        Operation::UpdateTask
    }
}

/// POST /api/tasks
async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>)> {
    let identity = state
        .admit(user.into_inner(), Operation::CreateTask, Target::Unscoped)
        .await?;

    require_text("title", &req.title, MAX_TITLE_LEN)?;
    if let Some(assignee) = &req.assigned_to {
        ensure_assignee(&state, assignee).await?;
    }

    let task = state.tracker.create_task(&req, &identity.id).await?;

    audit!(AuditAction::TaskCreate, user_id = %identity.id, resource_id = %task.id);

    Ok((StatusCode::CREATED, Json(ApiResponse::new(task))))
}

/// GET /api/tasks/{id}
async fn get_task(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Task>>> {
    state
        .admit(
            user.into_inner(),
            Operation::ReadTask,
            Target::Resource(id.clone()),
        )
        .await?;

    let task = state
        .tracker
        .get_task(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;

    Ok(Json(ApiResponse::new(task)))
}

/// PUT /api/tasks/{id}
async fn update_task(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<ApiResponse<Task>>> {
    let operation = update_operation(&patch);
    let identity = state
        .admit(user.into_inner(), operation, Target::Resource(id.clone()))
        .await?;

    if let Some(title) = &patch.title {
        require_text("title", title, MAX_TITLE_LEN)?;
    }
    if let Some(assignee) = &patch.assigned_to
        && !assignee.is_empty()
    {
        ensure_assignee(&state, assignee).await?;
    }

    let task = state
        .tracker
        .update_task(&id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("task", &id))?;

    let action = match operation {
        Operation::UpdateTaskStatus => AuditAction::TaskStatusChange,
        _ => AuditAction::TaskUpdate,
    };
    audit!(action, user_id = %identity.id, resource_id = %id, status = task.status.as_str());

    Ok(Json(ApiResponse::new(task)))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::DeleteTask,
            Target::Resource(id.clone()),
        )
        .await?;

    if !state.tracker.delete_task(&id).await? {
        return Err(ApiError::not_found("task", &id));
    }

    audit!(AuditAction::TaskDelete, user_id = %identity.id, resource_id = %id);

    Ok(Json(ApiResponse::new(Empty {})))
}

/// GET /api/tasks/{id}/comments
async fn list_task_comments(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Comment>>> {
    state
        .admit(
            user.into_inner(),
            Operation::ListTaskComments,
            Target::Resource(id.clone()),
        )
        .await?;

    if state.tracker.get_task(&id).await?.is_none() {
        return Err(ApiError::not_found("task", &id));
    }

    let comments = state.tracker.list_comments_for_task(&id).await?;
    Ok(Json(ListResponse::new(comments)))
}

async fn ensure_assignee(state: &AppState, user_id: &str) -> Result<()> {
    match state.users.get_by_id(user_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation("assigned_to", "no such user")),
    }
}
