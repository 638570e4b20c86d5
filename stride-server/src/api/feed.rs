use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{optional_user_from_headers, ApiError, ApiResult},
    state::AppState,
};
use stride_types::{FeedFilter, FeedPage, FeedPost, ListFeedRequest, Run};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    filter: Option<String>,
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

/// GET /feed?filter=default|following|trending&page=&limit=
pub async fn get_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedPage>> {
    let filter = match query.filter.as_deref() {
        None => FeedFilter::default(),
        Some(raw) => FeedFilter::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown feed filter: {raw}")))?,
    };

    let request = ListFeedRequest {
        filter,
        user_id: optional_user_from_headers(&headers)?,
        page: query.page.unwrap_or(1),
        limit: state.settings.pagination.resolve_limit(query.limit),
    };

    Ok(Json(state.feed.list_feed(&request)?))
}

/// GET /posts/:id - One enriched post
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<FeedPost>> {
    Ok(Json(state.feed.get_post(&post_id)?))
}

/// GET /posts/:id/run - Full run detail behind a post
pub async fn get_post_run(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> ApiResult<Json<Run>> {
    Ok(Json(state.feed.get_post_run(&post_id)?))
}
