use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{user_from_headers, ApiError, ApiResult},
    state::AppState,
};
use stride_types::{
    ListReactionsRequest, ReactionCounts, ReactionCountsRequest, ReactionPage, ReactionTarget,
    ReactionType, TargetType, ToggleReactionBody, ToggleReactionRequest, ToggleResult,
};

fn parse_target_type(raw: &str) -> Result<TargetType, ApiError> {
    TargetType::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid target type: {raw}. Must be 'post' or 'comment'"))
    })
}

fn parse_reaction_type(raw: &str) -> Result<ReactionType, ApiError> {
    ReactionType::parse(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid reaction type: {raw}. Must be one of like, funny, insightful, fire"
        ))
    })
}

/// POST /reactions/toggle - Add or remove one reaction for the acting user
pub async fn toggle_reaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ToggleReactionBody>,
) -> ApiResult<Json<ToggleResult>> {
    let request = ToggleReactionRequest {
        user_id: user_from_headers(&headers)?,
        target_id: payload.target_id,
        target_type: parse_target_type(&payload.target_type)?,
        reaction_type: parse_reaction_type(&payload.reaction_type)?,
    };
    Ok(Json(state.reactions.toggle(&request)?))
}

/// GET /reactions/:target_type/:target_id/counts - Counts for every reaction type
pub async fn get_counts(
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<ReactionCounts>> {
    let request = ReactionCountsRequest {
        target_id,
        target_type: parse_target_type(&target_type)?,
    };
    Ok(Json(state.reactions.counts(&request)?))
}

#[derive(Debug, Deserialize)]
pub struct ReactionsQuery {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

/// GET /reactions/:target_type/:target_id - Who reacted, newest first
pub async fn list_reactions(
    State(state): State<AppState>,
    Path((target_type, target_id)): Path<(String, Uuid)>,
    Query(query): Query<ReactionsQuery>,
) -> ApiResult<Json<ReactionPage>> {
    let request = ListReactionsRequest {
        target_id,
        target_type: parse_target_type(&target_type)?,
        page: query.page.unwrap_or(1),
        limit: state.settings.pagination.resolve_limit(query.limit),
    };
    Ok(Json(state.reactions.list(&request)?))
}

/// GET /reactions/:target_type/:target_id/mine - Types the acting user has applied
pub async fn get_mine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((target_type, target_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Vec<ReactionType>>> {
    let user_id = user_from_headers(&headers)?;
    let target = ReactionTarget::new(parse_target_type(&target_type)?, target_id);
    Ok(Json(state.reactions.user_reactions(&user_id, &target)?))
}
