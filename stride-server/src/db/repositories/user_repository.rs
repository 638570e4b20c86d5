use anyhow::{Context, Result};

use stride_types::User;

use crate::db::row::encode_time;
use crate::db::DbPool;

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub fn create(&self, user: &User) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, username, avatar_url, created_at) VALUES (?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.username,
                &user.avatar_url,
                encode_time(&user.created_at),
            ),
        )
        .context("Failed to create user")?;
        Ok(())
    }
}
