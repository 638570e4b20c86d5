use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::db::row::{self, encode_time};
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Follow a user
    pub fn follow_user(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            (
                follower_id.to_string(),
                following_id.to_string(),
                encode_time(&Utc::now()),
            ),
        )
        .context("Failed to follow user")?;
        Ok(())
    }

    /// Get list of users that this user is following
    pub fn get_following(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT following_id FROM follows WHERE follower_id = ? ORDER BY created_at DESC",
        )?;

        let following = stmt
            .query_map([user_id.to_string()], |row| row::uuid(row, 0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load follow targets")?;

        Ok(following)
    }
}
