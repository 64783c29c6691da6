//! Comment routes
//!
//! Anyone signed in may comment on an existing task. Only the author (or an
//! admin) edits or removes a comment.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};

use crate::audit;
use crate::audit::AuditAction;
use crate::auth::{AuthUser, Operation, Target};
use crate::error::{ApiError, Result};
use crate::routes::require_text;
use crate::state::AppState;
use crate::store::{Comment, CommentPatch, NewComment};
use crate::types::{ApiResponse, Empty};

const MAX_TEXT_LEN: usize = 2000;

/// Comment routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/{id}", put(update_comment).delete(delete_comment))
}

/// POST /api/comments
async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewComment>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>)> {
    let identity = state
        .admit(user.into_inner(), Operation::CreateComment, Target::Unscoped)
        .await?;

    require_text("text", &req.text, MAX_TEXT_LEN)?;

    let comment = state.tracker.create_comment(&req, &identity.id).await?;

    audit!(
        AuditAction::CommentCreate,
        user_id = %identity.id,
        resource_id = %comment.id,
        task_id = %comment.task_id
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::new(comment))))
}

/// PUT /api/comments/{id}
async fn update_comment(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<CommentPatch>,
) -> Result<Json<ApiResponse<Comment>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::UpdateComment,
            Target::Resource(id.clone()),
        )
        .await?;

    require_text("text", &req.text, MAX_TEXT_LEN)?;

    let comment = state
        .tracker
        .update_comment(&id, &req.text)
        .await?
        .ok_or_else(|| ApiError::not_found("comment", &id))?;

    audit!(AuditAction::CommentUpdate, user_id = %identity.id, resource_id = %id);

    Ok(Json(ApiResponse::new(comment)))
}

/// DELETE /api/comments/{id}
async fn delete_comment(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Empty>>> {
    let identity = state
        .admit(
            user.into_inner(),
            Operation::DeleteComment,
            Target::Resource(id.clone()),
        )
        .await?;

    if !state.tracker.delete_comment(&id).await? {
        return Err(ApiError::not_found("comment", &id));
    }

    audit!(AuditAction::CommentDelete, user_id = %identity.id, resource_id = %id);

    Ok(Json(ApiResponse::new(Empty {})))
}
