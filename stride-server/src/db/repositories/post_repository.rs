use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};
use uuid::Uuid;

use stride_types::{FeedAuthor, FeedPost, Post, PostStatus, RunSummary};

use crate::db::filter::{PostFilter, Predicate};
use crate::db::row::{self, encode_time};
use crate::db::DbPool;

/// Keep IN (...) lists well below SQLite's bound parameter limit
const ID_CHUNK_SIZE: usize = 500;

pub struct PostRepository {
    pool: DbPool,
}

/// Sort key of a feed candidate, fetched without the enrichment joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostKey {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

fn map_feed_post(row: &Row<'_>) -> rusqlite::Result<FeedPost> {
    let run = match row::optional_uuid(row, 8)? {
        Some(run_id) => Some(RunSummary {
            id: run_id,
            distance_meters: row.get(9)?,
            duration_seconds: row.get(10)?,
            pace_seconds_per_km: row.get(11)?,
            started_at: row::time(row, 12)?,
        }),
        None => None,
    };

    Ok(FeedPost {
        id: row::uuid(row, 0)?,
        author: FeedAuthor {
            id: row::uuid(row, 1)?,
            username: row.get(2)?,
            avatar_url: row.get(3)?,
        },
        title: row.get(4)?,
        content: row.get(5)?,
        run,
        comment_count: row::count(row, 13)?,
        reaction_count: row::count(row, 14)?,
        trending_score: None,
        created_at: row::time(row, 6)?,
        updated_at: row::time(row, 7)?,
    })
}

/// Posts joined with author and run, plus comment and reaction counts
fn feed_select(predicate: &Predicate) -> String {
    let live_comments = Predicate::live("c").sql();
    format!(
        "SELECT p.id, p.author_id, u.username, u.avatar_url, p.title, p.content, p.created_at, p.updated_at,
                r.id, r.distance_meters, r.duration_seconds, r.pace_seconds_per_km, r.started_at,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id AND {live_comments}) AS comment_count,
                (SELECT COUNT(*) FROM reactions x WHERE x.post_id = p.id) AS reaction_count
         FROM posts p
         JOIN users u ON u.id = p.author_id
         LEFT JOIN runs r ON r.id = p.run_id
         WHERE {}",
        predicate.sql()
    )
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub fn create(&self, post: &Post) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO posts (id, author_id, run_id, title, content, status, created_at, updated_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                post.id.to_string(),
                post.author_id.to_string(),
                post.run_id.map(|id| id.to_string()),
                &post.title,
                &post.content,
                post.status.as_str(),
                encode_time(&post.created_at),
                encode_time(&post.updated_at),
                post.deleted_at.as_ref().map(encode_time),
            ),
        )
        .context("Failed to create post")?;
        Ok(())
    }

    /// Whether a post exists, is visible and is not deleted
    pub fn is_listed(&self, post_id: &Uuid) -> Result<bool> {
        Ok(self.count(&PostFilter::by_ids(vec![*post_id]))? > 0)
    }

    /// Hide or re-show a post
    pub fn set_status(&self, post_id: &Uuid, status: PostStatus) -> Result<bool> {
        let conn = self.pool.get()?;
        let updated = conn
            .execute(
                "UPDATE posts SET status = ?, updated_at = ? WHERE id = ?",
                (status.as_str(), encode_time(&Utc::now()), post_id.to_string()),
            )
            .context("Failed to update post status")?;
        Ok(updated > 0)
    }

    /// Soft delete a post. Returns false when it was missing or already deleted.
    pub fn soft_delete(&self, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let now = encode_time(&Utc::now());
        let updated = conn
            .execute(
                "UPDATE posts SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                (&now, &now, post_id.to_string()),
            )
            .context("Failed to delete post")?;
        Ok(updated > 0)
    }

    /// Count posts matching a filter
    pub fn count(&self, filter: &PostFilter) -> Result<u64> {
        let conn = self.pool.get()?;
        let predicate = filter.to_predicate("p");
        let query = format!("SELECT COUNT(*) FROM posts p WHERE {}", predicate.sql());
        let total = conn
            .query_row(&query, params_from_iter(predicate.params()), |row| row::count(row, 0))
            .context("Failed to count posts")?;
        Ok(total)
    }

    /// Enriched posts matching a filter, newest first, windowed by limit/offset
    pub fn find_page(&self, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<FeedPost>> {
        let conn = self.pool.get()?;
        let predicate = filter.to_predicate("p");
        let query = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?",
            feed_select(&predicate)
        );

        let params = predicate
            .params()
            .iter()
            .cloned()
            .chain([Value::Integer(clamp_i64(limit)), Value::Integer(clamp_i64(offset))]);

        let mut stmt = conn.prepare(&query)?;
        let posts = stmt
            .query_map(params_from_iter(params), map_feed_post)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load feed posts")?;
        Ok(posts)
    }

    /// Sort keys of every post matching a filter
    pub fn find_keys(&self, filter: &PostFilter) -> Result<Vec<PostKey>> {
        let conn = self.pool.get()?;
        let predicate = filter.to_predicate("p");
        let query = format!("SELECT p.id, p.created_at FROM posts p WHERE {}", predicate.sql());

        let mut stmt = conn.prepare(&query)?;
        let keys = stmt
            .query_map(params_from_iter(predicate.params()), |row| {
                Ok(PostKey {
                    id: row::uuid(row, 0)?,
                    created_at: row::time(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load feed candidates")?;
        Ok(keys)
    }

    /// Enriched listed posts for the given ids, in the order of `ids`.
    /// Ids that are missing, hidden or deleted are skipped.
    pub fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<FeedPost>> {
        let conn = self.pool.get()?;
        let mut by_id = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let predicate = PostFilter::by_ids(chunk.to_vec()).to_predicate("p");
            let query = feed_select(&predicate);
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map(params_from_iter(predicate.params()), map_feed_post)?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to load posts by id")?;
            by_id.extend(rows.into_iter().map(|post| (post.id, post)));
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Reactions plus live comments created after `cutoff`, per post.
    /// Posts without any engagement in the window are absent from the map.
    pub fn engagement_since(&self, post_ids: &[Uuid], cutoff: DateTime<Utc>) -> Result<HashMap<Uuid, u64>> {
        let conn = self.pool.get()?;
        let cutoff = Value::Text(encode_time(&cutoff));
        let mut scores = HashMap::new();

        for chunk in post_ids.chunks(ID_CHUNK_SIZE) {
            let reactions = Predicate::default()
                .and_in("x.post_id", chunk)
                .and("x.created_at > ?", [cutoff.clone()]);
            let comments = Predicate::live("c")
                .and_in("c.post_id", chunk)
                .and("c.created_at > ?", [cutoff.clone()]);

            let query = format!(
                "SELECT post_id, SUM(n) FROM (
                     SELECT x.post_id AS post_id, COUNT(*) AS n FROM reactions x
                     WHERE {} GROUP BY x.post_id
                     UNION ALL
                     SELECT c.post_id AS post_id, COUNT(*) AS n FROM comments c
                     WHERE {} GROUP BY c.post_id
                 ) GROUP BY post_id",
                reactions.sql(),
                comments.sql()
            );
            let params = reactions.params().iter().chain(comments.params());

            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map(params_from_iter(params), |row| Ok((row::uuid(row, 0)?, row::count(row, 1)?)))?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to aggregate engagement")?;
            scores.extend(rows);
        }

        Ok(scores)
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CommentRepository, ReactionRepository, RunRepository, UserRepository};
    use crate::db::Database;
    use chrono::Duration;
    use stride_types::{Comment, Reaction, ReactionTarget, ReactionType, Run, User};

    fn setup() -> Result<(Database, PostRepository, User)> {
        let db = Database::in_memory()?;
        let author = User::new("alice", Some("https://avatars.stride.run/alice.png".to_string()));
        UserRepository::new(db.pool.clone()).create(&author)?;
        let repo = PostRepository::new(db.pool.clone());
        Ok((db, repo, author))
    }

    #[test]
    fn test_find_page_newest_first_and_listed_only() -> Result<()> {
        let (_db, repo, author) = setup()?;
        let now = Utc::now();

        let old = Post::new(author.id, None, "old", "").backdated(now - Duration::hours(3));
        let new = Post::new(author.id, None, "new", "").backdated(now - Duration::hours(1));
        let hidden = Post::new(author.id, None, "hidden", "")
            .backdated(now - Duration::minutes(30))
            .with_status(PostStatus::Hidden, now);
        let deleted = Post::new(author.id, None, "deleted", "").backdated(now - Duration::minutes(10));
        for post in [&old, &new, &hidden, &deleted] {
            repo.create(post)?;
        }
        assert!(repo.soft_delete(&deleted.id)?);
        assert!(!repo.soft_delete(&deleted.id)?, "second delete is a no-op");

        let page = repo.find_page(&PostFilter::listed(), 10, 0)?;
        let titles: Vec<_> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old"]);
        assert_eq!(repo.count(&PostFilter::listed())?, 2);

        let second = repo.find_page(&PostFilter::listed(), 1, 1)?;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "old");
        Ok(())
    }

    #[test]
    fn test_feed_rows_are_enriched() -> Result<()> {
        let (db, repo, author) = setup()?;
        let run = Run::new(author.id, 5000.0, 1500, None, Utc::now());
        RunRepository::new(db.pool.clone()).create(&run)?;

        let post = Post::new(author.id, Some(run.id), "5k", "steady");
        repo.create(&post)?;

        let comments = CommentRepository::new(db.pool.clone());
        let kept = Comment::new(post.id, author.id, None, "nice");
        let removed = Comment::new(post.id, author.id, None, "oops");
        comments.insert(&kept)?;
        comments.insert(&removed)?;
        comments.soft_delete(&removed.id)?;

        ReactionRepository::new(db.pool.clone())
            .insert(&Reaction::new(author.id, ReactionTarget::Post(post.id), ReactionType::Fire))?;

        let found = repo.find_by_ids(&[post.id])?;
        assert_eq!(found.len(), 1);
        let item = &found[0];
        assert_eq!(item.author.username, "alice");
        assert_eq!(item.author.avatar_url, author.avatar_url);
        assert_eq!(item.comment_count, 1);
        assert_eq!(item.reaction_count, 1);
        let summary = item.run.as_ref().expect("run summary attached");
        assert_eq!(summary.id, run.id);
        assert_eq!(summary.pace_seconds_per_km, 300.0);
        Ok(())
    }

    #[test]
    fn test_find_by_ids_keeps_requested_order() -> Result<()> {
        let (_db, repo, author) = setup()?;
        let a = Post::new(author.id, None, "a", "");
        let b = Post::new(author.id, None, "b", "");
        let c = Post::new(author.id, None, "c", "");
        for post in [&a, &b, &c] {
            repo.create(post)?;
        }
        repo.set_status(&b.id, PostStatus::Hidden)?;

        let found = repo.find_by_ids(&[c.id, b.id, a.id, Uuid::now_v7()])?;
        let titles: Vec<_> = found.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
        Ok(())
    }

    #[test]
    fn test_engagement_since_counts_only_recent_events() -> Result<()> {
        let (db, repo, author) = setup()?;
        let now = Utc::now();
        let hot = Post::new(author.id, None, "hot", "");
        let cold = Post::new(author.id, None, "cold", "");
        repo.create(&hot)?;
        repo.create(&cold)?;

        let reactions = ReactionRepository::new(db.pool.clone());
        for reaction_type in [ReactionType::Like, ReactionType::Fire] {
            reactions.insert(
                &Reaction::new(author.id, ReactionTarget::Post(hot.id), reaction_type)
                    .backdated(now - Duration::hours(2)),
            )?;
        }
        reactions.insert(
            &Reaction::new(author.id, ReactionTarget::Post(cold.id), ReactionType::Like)
                .backdated(now - Duration::days(2)),
        )?;

        let comments = CommentRepository::new(db.pool.clone());
        comments.insert(&Comment::new(hot.id, author.id, None, "fresh").backdated(now - Duration::hours(1)))?;
        let deleted = Comment::new(hot.id, author.id, None, "gone").backdated(now - Duration::hours(1));
        comments.insert(&deleted)?;
        comments.soft_delete(&deleted.id)?;

        let scores = repo.engagement_since(&[hot.id, cold.id], now - Duration::days(1))?;
        assert_eq!(scores.get(&hot.id), Some(&3));
        assert_eq!(scores.get(&cold.id), None);
        Ok(())
    }
}
