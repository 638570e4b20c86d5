use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{FeedFilter, PostStatus, ReactionType, TargetType, ToggleAction};

/// Timestamps carry microsecond precision, matching what storage keeps
pub fn to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

fn now() -> DateTime<Utc> {
    to_micros(Utc::now())
}

// Custom serde modules for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

mod optional_datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, avatar_url: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            avatar_url,
            created_at: now(),
        }
    }
}

/// Immutable record of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub user_id: Uuid,
    pub distance_meters: f64,
    pub duration_seconds: i64,
    /// Seconds per kilometre, derived from distance and duration at creation
    pub pace_seconds_per_km: f64,
    /// Encoded polyline of the route, when the device recorded one
    #[serde(default)]
    pub route: Option<String>,
    #[serde(with = "datetime_format")]
    pub started_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl Run {
    pub fn new(
        user_id: Uuid,
        distance_meters: f64,
        duration_seconds: i64,
        route: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            distance_meters,
            duration_seconds,
            pace_seconds_per_km: pace_seconds_per_km(distance_meters, duration_seconds),
            route,
            started_at: to_micros(started_at),
            created_at: now(),
        }
    }
}

/// Pace in seconds per kilometre; zero when no distance was covered
pub fn pace_seconds_per_km(distance_meters: f64, duration_seconds: i64) -> f64 {
    if distance_meters <= 0.0 {
        return 0.0;
    }
    duration_seconds as f64 / (distance_meters / 1000.0)
}

/// Run fields shown alongside a post in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub distance_meters: f64,
    pub duration_seconds: i64,
    pub pace_seconds_per_km: f64,
    #[serde(with = "datetime_format")]
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    #[serde(default)]
    pub run_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "optional_datetime_format")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn new(
        author_id: Uuid,
        run_id: Option<Uuid>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = now();
        Self {
            id: Uuid::now_v7(),
            author_id,
            run_id,
            title: title.into(),
            content: content.into(),
            status: PostStatus::Visible,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Copy of this post with a different creation time (and a matching id)
    pub fn backdated(&self, created_at: DateTime<Utc>) -> Self {
        let created_at = to_micros(created_at);
        Self {
            id: uuid_at(created_at),
            created_at,
            updated_at: created_at,
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: PostStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: to_micros(now),
            ..self.clone()
        }
    }

    /// Feed listings only ever show visible, non-deleted posts
    pub fn is_listed(&self) -> bool {
        self.status == PostStatus::Visible && self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    /// Parent comment for replies (None for top-level comments)
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "optional_datetime_format")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: Uuid,
        parent_comment_id: Option<Uuid>,
        content: impl Into<String>,
    ) -> Self {
        let now = now();
        Self {
            id: Uuid::now_v7(),
            post_id,
            author_id,
            parent_comment_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Copy of this comment with a different creation time (and a matching id)
    pub fn backdated(&self, created_at: DateTime<Utc>) -> Self {
        let created_at = to_micros(created_at);
        Self {
            id: uuid_at(created_at),
            created_at,
            updated_at: created_at,
            ..self.clone()
        }
    }

    pub fn with_content(&self, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            updated_at: to_micros(now),
            ..self.clone()
        }
    }

    pub fn deleted(&self, now: DateTime<Utc>) -> Self {
        let now = to_micros(now);
        Self {
            deleted_at: Some(now),
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

/// Comment plus the author and reply details a thread view needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
    #[serde(default)]
    pub author_avatar_url: Option<String>,
    /// Number of live (non-deleted) direct replies
    pub reply_count: u64,
}

/// The entity a reaction is attached to. Exactly one of post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "lowercase")]
pub enum ReactionTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl ReactionTarget {
    pub fn new(target_type: TargetType, target_id: Uuid) -> Self {
        match target_type {
            TargetType::Post => ReactionTarget::Post(target_id),
            TargetType::Comment => ReactionTarget::Comment(target_id),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => *id,
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            ReactionTarget::Post(_) => TargetType::Post,
            ReactionTarget::Comment(_) => TargetType::Comment,
        }
    }

    pub fn post_id(&self) -> Option<Uuid> {
        match self {
            ReactionTarget::Post(id) => Some(*id),
            ReactionTarget::Comment(_) => None,
        }
    }

    pub fn comment_id(&self) -> Option<Uuid> {
        match self {
            ReactionTarget::Comment(id) => Some(*id),
            ReactionTarget::Post(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub target: ReactionTarget,
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: Uuid, target: ReactionTarget, reaction_type: ReactionType) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            target,
            reaction_type,
            created_at: now(),
        }
    }

    /// Copy of this reaction with a different creation time (and a matching id)
    pub fn backdated(&self, created_at: DateTime<Utc>) -> Self {
        let created_at = to_micros(created_at);
        Self {
            id: uuid_at(created_at),
            created_at,
            ..self.clone()
        }
    }
}

/// Reaction plus the reactor's display details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionView {
    #[serde(flatten)]
    pub reaction: Reaction,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Reaction counts for one entity. Every type is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub like: u64,
    pub funny: u64,
    pub insightful: u64,
    pub fire: u64,
}

impl ReactionCounts {
    pub fn get(&self, reaction_type: ReactionType) -> u64 {
        match reaction_type {
            ReactionType::Like => self.like,
            ReactionType::Funny => self.funny,
            ReactionType::Insightful => self.insightful,
            ReactionType::Fire => self.fire,
        }
    }

    pub fn with_count(self, reaction_type: ReactionType, count: u64) -> Self {
        match reaction_type {
            ReactionType::Like => Self { like: count, ..self },
            ReactionType::Funny => Self { funny: count, ..self },
            ReactionType::Insightful => Self { insightful: count, ..self },
            ReactionType::Fire => Self { fire: count, ..self },
        }
    }

    pub fn total(&self) -> u64 {
        ReactionType::ALL.iter().map(|t| self.get(*t)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResult {
    pub action: ToggleAction,
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedAuthor {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A post as it appears in a feed, with author, run and engagement details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author: FeedAuthor,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub run: Option<RunSummary>,
    pub comment_count: u64,
    pub reaction_count: u64,
    /// Engagement score inside the lookback window (trending feeds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trending_score: Option<u64>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionPage {
    pub reactions: Vec<ReactionView>,
    pub pagination: Pagination,
}

/// UUIDv7 whose embedded timestamp matches `at`, so ids keep sorting by time
fn uuid_at(at: DateTime<Utc>) -> Uuid {
    let secs = at.timestamp().max(0) as u64;
    let ts = uuid::Timestamp::from_unix(uuid::NoContext, secs, at.timestamp_subsec_nanos());
    Uuid::new_v7(ts)
}

// Request/Response types for the core operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFeedRequest {
    #[serde(default)]
    pub filter: FeedFilter,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleReactionRequest {
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub target_type: TargetType,
    #[serde(rename = "type")]
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionCountsRequest {
    pub target_id: Uuid,
    pub target_type: TargetType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListReactionsRequest {
    pub target_id: Uuid,
    pub target_type: TargetType,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCommentsRequest {
    pub post_id: Uuid,
    pub page: i64,
    pub limit: i64,
    #[serde(default = "default_top_level_only")]
    pub top_level_only: bool,
}

fn default_top_level_only() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRepliesRequest {
    pub parent_comment_id: Uuid,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleReactionBody {
    pub target_id: Uuid,
    pub target_type: String,
    #[serde(rename = "type")]
    pub reaction_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
