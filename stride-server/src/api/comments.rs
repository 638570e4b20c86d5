use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{user_from_headers, ApiResult},
    state::AppState,
};
use stride_types::{
    Comment, CommentPage, CreateCommentRequest, ListCommentsRequest, ListRepliesRequest,
    UpdateCommentRequest,
};

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    top_level_only: Option<bool>,
}

/// GET /posts/:id/comments - Top-level comments unless top_level_only=false
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(query): Query<CommentsQuery>,
) -> ApiResult<Json<CommentPage>> {
    let request = ListCommentsRequest {
        post_id,
        page: query.page.unwrap_or(1),
        limit: state.settings.pagination.resolve_limit(query.limit),
        top_level_only: query.top_level_only.unwrap_or(true),
    };
    Ok(Json(state.comments.list_comments(&request)?))
}

/// POST /posts/:id/comments - Comment on a post, or reply with parent_comment_id
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let author_id = user_from_headers(&headers)?;
    let comment = state.comments.create(post_id, author_id, &payload)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /comments/:id/replies - Direct replies to a comment
pub async fn list_replies(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Query(query): Query<CommentsQuery>,
) -> ApiResult<Json<CommentPage>> {
    let request = ListRepliesRequest {
        parent_comment_id: comment_id,
        page: query.page.unwrap_or(1),
        limit: state.settings.pagination.resolve_limit(query.limit),
    };
    Ok(Json(state.comments.list_replies(&request)?))
}

/// PUT /comments/:id - Replace a comment's content
pub async fn update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    user_from_headers(&headers)?;
    Ok(Json(state.comments.update(&comment_id, &payload.content)?))
}

/// DELETE /comments/:id - Soft delete; replies stay visible
pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    user_from_headers(&headers)?;
    state.comments.remove(&comment_id)?;
    Ok(StatusCode::NO_CONTENT)
}
