use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use stride_types::{
    Comment, CommentView, FeedPost, Reaction, ReactionCounts, ReactionTarget, ReactionType,
    ReactionView, Run, ToggleAction,
};

use crate::db::filter::{CommentFilter, PostFilter};
use crate::db::repositories::{
    CommentRepository, FollowRepository, PostKey, PostRepository, ReactionRepository,
    RunRepository,
};
use crate::db::DbPool;

/// Storage primitives the feed, comment and reaction services are built on.
///
/// Post and comment reads take a [`PostFilter`] / [`CommentFilter`], which
/// always carry the visibility predicate, so implementations never return
/// hidden or soft-deleted rows from a listing.
pub trait StorageAdapter: Send + Sync {
    /// Enriched posts matching a filter, newest first (ties by id), windowed
    fn find_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<FeedPost>>;

    fn count_posts(&self, filter: &PostFilter) -> Result<u64>;

    /// Sort keys of every post matching a filter, in no particular order
    fn find_post_keys(&self, filter: &PostFilter) -> Result<Vec<PostKey>>;

    /// Enriched listed posts in the order of `ids`; unlisted ids are skipped
    fn find_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<FeedPost>>;

    /// One enriched post, if it is listed
    fn find_post(&self, post_id: &Uuid) -> Result<Option<FeedPost>>;

    fn is_post_listed(&self, post_id: &Uuid) -> Result<bool>;

    /// Reaction + live comment counts per post for events after `cutoff`
    fn engagement_since(&self, post_ids: &[Uuid], cutoff: DateTime<Utc>) -> Result<HashMap<Uuid, u64>>;

    fn find_run_by_post_id(&self, post_id: &Uuid) -> Result<Option<Run>>;

    fn find_follow_targets(&self, user_id: &Uuid) -> Result<Vec<Uuid>>;

    fn find_reactions(&self, target: &ReactionTarget, limit: u64, offset: u64) -> Result<Vec<ReactionView>>;

    fn count_reactions(&self, target: &ReactionTarget) -> Result<u64>;

    fn count_reactions_by_type(&self, target: &ReactionTarget) -> Result<ReactionCounts>;

    fn find_user_reaction_types(&self, user_id: &Uuid, target: &ReactionTarget) -> Result<Vec<ReactionType>>;

    /// Returns false when an identical reaction already existed
    fn insert_reaction(&self, reaction: &Reaction) -> Result<bool>;

    fn delete_reaction(&self, reaction_id: &Uuid) -> Result<bool>;

    /// Atomic remove-if-present / add-if-absent
    fn toggle_reaction(&self, user_id: &Uuid, target: &ReactionTarget, reaction_type: ReactionType) -> Result<ToggleAction>;

    fn find_comments(&self, filter: &CommentFilter, limit: u64, offset: u64) -> Result<Vec<CommentView>>;

    fn count_comments(&self, filter: &CommentFilter) -> Result<u64>;

    /// A comment unless it is soft-deleted
    fn find_comment(&self, comment_id: &Uuid) -> Result<Option<Comment>>;

    fn insert_comment(&self, comment: &Comment) -> Result<()>;

    /// Returns false when the comment is missing or deleted
    fn update_comment(&self, comment: &Comment) -> Result<bool>;

    /// Returns false when the comment is missing or already deleted
    fn soft_delete_comment(&self, comment_id: &Uuid) -> Result<bool>;
}

/// SQLite-backed storage adapter composed from the repositories
pub struct SqliteStorage {
    posts: PostRepository,
    comments: CommentRepository,
    reactions: ReactionRepository,
    follows: FollowRepository,
    runs: RunRepository,
}

impl SqliteStorage {
    pub fn new(pool: DbPool) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            reactions: ReactionRepository::new(pool.clone()),
            follows: FollowRepository::new(pool.clone()),
            runs: RunRepository::new(pool),
        }
    }
}

impl StorageAdapter for SqliteStorage {
    fn find_posts(&self, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<FeedPost>> {
        self.posts.find_page(filter, limit, offset)
    }

    fn count_posts(&self, filter: &PostFilter) -> Result<u64> {
        self.posts.count(filter)
    }

    fn find_post_keys(&self, filter: &PostFilter) -> Result<Vec<PostKey>> {
        self.posts.find_keys(filter)
    }

    fn find_posts_by_ids(&self, ids: &[Uuid]) -> Result<Vec<FeedPost>> {
        self.posts.find_by_ids(ids)
    }

    fn find_post(&self, post_id: &Uuid) -> Result<Option<FeedPost>> {
        Ok(self.posts.find_by_ids(&[*post_id])?.into_iter().next())
    }

    fn is_post_listed(&self, post_id: &Uuid) -> Result<bool> {
        self.posts.is_listed(post_id)
    }

    fn engagement_since(&self, post_ids: &[Uuid], cutoff: DateTime<Utc>) -> Result<HashMap<Uuid, u64>> {
        self.posts.engagement_since(post_ids, cutoff)
    }

    fn find_run_by_post_id(&self, post_id: &Uuid) -> Result<Option<Run>> {
        self.runs.find_by_post_id(post_id)
    }

    fn find_follow_targets(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        self.follows.get_following(user_id)
    }

    fn find_reactions(&self, target: &ReactionTarget, limit: u64, offset: u64) -> Result<Vec<ReactionView>> {
        self.reactions.find_for_target(target, limit, offset)
    }

    fn count_reactions(&self, target: &ReactionTarget) -> Result<u64> {
        self.reactions.count(target)
    }

    fn count_reactions_by_type(&self, target: &ReactionTarget) -> Result<ReactionCounts> {
        self.reactions.count_by_type(target)
    }

    fn find_user_reaction_types(&self, user_id: &Uuid, target: &ReactionTarget) -> Result<Vec<ReactionType>> {
        self.reactions.user_types(user_id, target)
    }

    fn insert_reaction(&self, reaction: &Reaction) -> Result<bool> {
        self.reactions.insert(reaction)
    }

    fn delete_reaction(&self, reaction_id: &Uuid) -> Result<bool> {
        self.reactions.delete(reaction_id)
    }

    fn toggle_reaction(&self, user_id: &Uuid, target: &ReactionTarget, reaction_type: ReactionType) -> Result<ToggleAction> {
        self.reactions.toggle(user_id, target, reaction_type)
    }

    fn find_comments(&self, filter: &CommentFilter, limit: u64, offset: u64) -> Result<Vec<CommentView>> {
        self.comments.find(filter, limit, offset)
    }

    fn count_comments(&self, filter: &CommentFilter) -> Result<u64> {
        self.comments.count(filter)
    }

    fn find_comment(&self, comment_id: &Uuid) -> Result<Option<Comment>> {
        self.comments.get_live(comment_id)
    }

    fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.comments.insert(comment)
    }

    fn update_comment(&self, comment: &Comment) -> Result<bool> {
        self.comments
            .update_content(&comment.id, &comment.content, comment.updated_at)
    }

    fn soft_delete_comment(&self, comment_id: &Uuid) -> Result<bool> {
        self.comments.soft_delete(comment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, UserRepository};
    use crate::db::Database;
    use stride_types::{Post, User};

    fn setup() -> Result<(Database, SqliteStorage, User, Post)> {
        let db = Database::in_memory()?;
        let user = User::new("erin", None);
        UserRepository::new(db.pool.clone()).create(&user)?;
        let post = Post::new(user.id, None, "Parkrun", "");
        PostRepository::new(db.pool.clone()).create(&post)?;
        let storage = SqliteStorage::new(db.pool.clone());
        Ok((db, storage, user, post))
    }

    #[test]
    fn test_duplicate_reaction_insert_is_a_no_op() -> Result<()> {
        let (_db, storage, user, post) = setup()?;
        let target = ReactionTarget::Post(post.id);
        let first = Reaction::new(user.id, target, ReactionType::Like);
        let again = Reaction::new(user.id, target, ReactionType::Like);

        assert!(storage.insert_reaction(&first)?);
        assert!(!storage.insert_reaction(&again)?);
        assert_eq!(storage.count_reactions(&target)?, 1);

        assert!(storage.delete_reaction(&first.id)?);
        assert!(!storage.delete_reaction(&first.id)?);
        assert_eq!(storage.count_reactions(&target)?, 0);
        Ok(())
    }

    #[test]
    fn test_find_post_only_returns_listed_posts() -> Result<()> {
        let (db, storage, _user, post) = setup()?;
        assert_eq!(storage.find_post(&post.id)?.map(|p| p.id), Some(post.id));

        PostRepository::new(db.pool.clone()).soft_delete(&post.id)?;
        assert!(storage.find_post(&post.id)?.is_none());
        assert!(!storage.is_post_listed(&post.id)?);
        Ok(())
    }
}
