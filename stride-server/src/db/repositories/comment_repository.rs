use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use stride_types::{Comment, CommentView};

use crate::db::filter::{CommentFilter, Predicate};
use crate::db::row::{self, encode_time};
use crate::db::DbPool;

pub struct CommentRepository {
    pool: DbPool,
}

const COMMENT_COLUMNS: &str = "c.id, c.post_id, c.author_id, c.parent_comment_id, c.content,
                               c.created_at, c.updated_at, c.deleted_at";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row::uuid(row, 0)?,
        post_id: row::uuid(row, 1)?,
        author_id: row::uuid(row, 2)?,
        parent_comment_id: row::optional_uuid(row, 3)?,
        content: row.get(4)?,
        created_at: row::time(row, 5)?,
        updated_at: row::time(row, 6)?,
        deleted_at: row::optional_time(row, 7)?,
    })
}

fn map_comment_view(row: &Row<'_>) -> rusqlite::Result<CommentView> {
    Ok(CommentView {
        comment: map_comment(row)?,
        author_username: row.get(8)?,
        author_avatar_url: row.get(9)?,
        reply_count: row::count(row, 10)?,
    })
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new comment
    pub fn insert(&self, comment: &Comment) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, parent_comment_id, content, created_at, updated_at, deleted_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                comment.id.to_string(),
                comment.post_id.to_string(),
                comment.author_id.to_string(),
                comment.parent_comment_id.map(|id| id.to_string()),
                &comment.content,
                encode_time(&comment.created_at),
                encode_time(&comment.updated_at),
                comment.deleted_at.as_ref().map(encode_time),
            ),
        )
        .context("Failed to create comment")?;
        Ok(())
    }

    /// Get a comment by ID unless it has been soft-deleted
    pub fn get_live(&self, comment_id: &Uuid) -> Result<Option<Comment>> {
        let conn = self.pool.get()?;
        let predicate = Predicate::live("c").and("c.id = ?", [Value::Text(comment_id.to_string())]);
        let query = format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE {}", predicate.sql());
        let comment = conn
            .query_row(&query, params_from_iter(predicate.params()), map_comment)
            .optional()
            .context("Failed to load comment")?;
        Ok(comment)
    }

    /// Comments matching a filter, newest first (ties broken by id), windowed
    pub fn find(&self, filter: &CommentFilter, limit: u64, offset: u64) -> Result<Vec<CommentView>> {
        let conn = self.pool.get()?;
        let predicate = filter.to_predicate("c");
        let live_replies = Predicate::live("r").sql();
        let query = format!(
            "SELECT {COMMENT_COLUMNS}, u.username, u.avatar_url,
                    (SELECT COUNT(*) FROM comments r WHERE r.parent_comment_id = c.id AND {live_replies}) AS reply_count
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE {}
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT ? OFFSET ?",
            predicate.sql()
        );

        let params = predicate.params().iter().cloned().chain([
            Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)),
            Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)),
        ]);

        let mut stmt = conn.prepare(&query)?;
        let comments = stmt
            .query_map(params_from_iter(params), map_comment_view)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load comments")?;
        Ok(comments)
    }

    /// Count comments matching a filter
    pub fn count(&self, filter: &CommentFilter) -> Result<u64> {
        let conn = self.pool.get()?;
        let predicate = filter.to_predicate("c");
        let query = format!("SELECT COUNT(*) FROM comments c WHERE {}", predicate.sql());
        let total = conn
            .query_row(&query, params_from_iter(predicate.params()), |row| row::count(row, 0))
            .context("Failed to count comments")?;
        Ok(total)
    }

    /// Replace the content of a live comment. Returns false when it is missing or deleted.
    pub fn update_content(&self, comment_id: &Uuid, content: &str, now: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let updated = conn
            .execute(
                "UPDATE comments SET content = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                (content, encode_time(&now), comment_id.to_string()),
            )
            .context("Failed to update comment")?;
        Ok(updated > 0)
    }

    /// Soft delete a comment. Replies are left untouched.
    pub fn soft_delete(&self, comment_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let now = encode_time(&Utc::now());
        let updated = conn
            .execute(
                "UPDATE comments SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                (&now, &now, comment_id.to_string()),
            )
            .context("Failed to delete comment")?;
        Ok(updated > 0)
    }
}
