pub mod comments;
pub mod error;
pub mod feed;
pub mod reactions;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use crate::state::AppState;

pub use error::{ApiError, ApiResult};

/// Header carrying the acting user, set by the authentication layer in front of us
pub const USER_HEADER: &str = "X-User-Id";

/// Acting user for endpoints that write on someone's behalf
fn user_from_headers(headers: &HeaderMap) -> ApiResult<Uuid> {
    optional_user_from_headers(headers)?
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_HEADER} header")))
}

/// Acting user for endpoints that work anonymously too
fn optional_user_from_headers(headers: &HeaderMap) -> ApiResult<Option<Uuid>> {
    let Some(value) = headers.get(USER_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {USER_HEADER} header")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Feed and post routes
        .route("/feed", get(feed::get_feed))
        .route("/posts/:id", get(feed::get_post))
        .route("/posts/:id/run", get(feed::get_post_run))
        // Comment routes
        .route(
            "/posts/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/:id/replies", get(comments::list_replies))
        .route(
            "/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        // Reaction routes
        .route("/reactions/toggle", post(reactions::toggle_reaction))
        .route("/reactions/:target_type/:target_id", get(reactions::list_reactions))
        .route("/reactions/:target_type/:target_id/counts", get(reactions::get_counts))
        .route("/reactions/:target_type/:target_id/mine", get(reactions::get_mine))
        .with_state(state)
}

/// GET /health - Also checks that a pooled connection can answer a query
async fn health_check(State(state): State<AppState>) -> ApiResult<&'static str> {
    let conn = state.db.connection()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(anyhow::Error::from)?;
    Ok("OK")
}
