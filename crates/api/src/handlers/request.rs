//! Handlers for the `/requests` resource and its comment thread.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use echo_core::error::CoreError;
use echo_core::request::{validate_effort, validate_priority, validate_status, validate_title};
use echo_db::models::comment::{CommentWithAuthor, CreateComment};
use echo_db::models::request::{
    CreateRequest, Request, RequestDetail, RequestWithRelations, UpdateRequest,
};
use echo_db::repositories::{CommentRepo, RequestRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::MessageResponse;
use crate::state::AppState;

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::not_found("Request", id))
}

/// Reject enum and effort values the store would refuse.
fn validate_fields(
    priority: Option<&str>,
    status: Option<&str>,
    effort: Option<i32>,
) -> Result<(), CoreError> {
    validate_priority(priority)?;
    validate_status(status)?;
    effort.map(validate_effort).transpose()?;
    Ok(())
}

/// GET /api/requests
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<RequestWithRelations>>> {
    let requests = RequestRepo::list_with_relations(&state.pool).await?;
    Ok(Json(requests))
}

/// GET /api/requests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<RequestDetail>> {
    let detail = RequestRepo::find_detail(&state.pool, &id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(detail))
}

/// POST /api/requests
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<Request>)> {
    validate_title(&input.title)?;
    validate_fields(
        input.priority.as_deref(),
        input.status.as_deref(),
        input.effort,
    )?;

    let request = RequestRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        request_id = %request.id,
        user_id = auth.user_id,
        customers = input.customers.len(),
        labels = input.labels.len(),
        "Request created",
    );

    Ok((StatusCode::CREATED, Json(request)))
}

/// PUT /api/requests/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateRequest>,
) -> AppResult<Json<Request>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    validate_fields(
        input.priority.as_deref(),
        input.status.as_deref(),
        input.effort,
    )?;

    let request = RequestRepo::update(&state.pool, &id, auth.user_id, &input)
        .await?
        .ok_or_else(|| not_found(&id))?;

    tracing::info!(request_id = %request.id, user_id = auth.user_id, "Request updated");

    Ok(Json(request))
}

/// DELETE /api/requests/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !RequestRepo::delete(&state.pool, &id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(request_id = %id, user_id = auth.user_id, "Request deleted");

    Ok(Json(MessageResponse::new("Request removed")))
}

/// GET /api/requests/{id}/comments
///
/// Unknown ids yield an empty list rather than 404.
pub async fn list_comments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    let comments = CommentRepo::list_for_request(&state.pool, &id).await?;
    Ok(Json(comments))
}

/// POST /api/requests/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    AppJson(input): AppJson<CreateComment>,
) -> AppResult<(StatusCode, Json<CommentWithAuthor>)> {
    let comment = CommentRepo::create(&state.pool, &id, auth.user_id, &input.content)
        .await?
        .ok_or_else(|| not_found(&id))?;

    tracing::info!(
        request_id = %id,
        comment_id = comment.comment.id,
        user_id = auth.user_id,
        "Comment added",
    );

    Ok((StatusCode::CREATED, Json(comment)))
}
