use anyhow::{Context, Result};
use rusqlite::{Row, TransactionBehavior};
use uuid::Uuid;

use stride_types::{
    Reaction, ReactionCounts, ReactionTarget, ReactionType, ReactionView, ToggleAction,
};

use crate::db::row::{self, encode_time};
use crate::db::DbPool;

pub struct ReactionRepository {
    pool: DbPool,
}

/// Column holding the target id for this kind of target
fn target_column(target: &ReactionTarget) -> &'static str {
    match target {
        ReactionTarget::Post(_) => "post_id",
        ReactionTarget::Comment(_) => "comment_id",
    }
}

fn map_reaction(row: &Row<'_>) -> rusqlite::Result<Reaction> {
    let post_id = row::optional_uuid(row, 2)?;
    let comment_id = row::optional_uuid(row, 3)?;
    let target = match (post_id, comment_id) {
        (Some(id), None) => ReactionTarget::Post(id),
        (None, Some(id)) => ReactionTarget::Comment(id),
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                "reaction must reference exactly one of post_id or comment_id".into(),
            ))
        }
    };

    Ok(Reaction {
        id: row::uuid(row, 0)?,
        user_id: row::uuid(row, 1)?,
        target,
        reaction_type: row::parsed(row, 4, ReactionType::parse)?,
        created_at: row::time(row, 5)?,
    })
}

const INSERT_REACTION: &str =
    "INSERT INTO reactions (id, user_id, post_id, comment_id, type, created_at)
     VALUES (?, ?, ?, ?, ?, ?)
     ON CONFLICT DO NOTHING";

fn insert_params(reaction: &Reaction) -> (String, String, Option<String>, Option<String>, &'static str, String) {
    (
        reaction.id.to_string(),
        reaction.user_id.to_string(),
        reaction.target.post_id().map(|id| id.to_string()),
        reaction.target.comment_id().map(|id| id.to_string()),
        reaction.reaction_type.as_str(),
        encode_time(&reaction.created_at),
    )
}

impl ReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a reaction. Returns false when the user already has this
    /// reaction type on the target (the unique index turns it into a no-op).
    pub fn insert(&self, reaction: &Reaction) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = conn
            .execute(INSERT_REACTION, insert_params(reaction))
            .context("Failed to insert reaction")?;
        Ok(inserted > 0)
    }

    /// Delete a reaction by id
    pub fn delete(&self, reaction_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn
            .execute("DELETE FROM reactions WHERE id = ?", [reaction_id.to_string()])
            .context("Failed to delete reaction")?;
        Ok(deleted > 0)
    }

    /// Remove the reaction if present, otherwise add it, in one write transaction
    pub fn toggle(&self, user_id: &Uuid, target: &ReactionTarget, reaction_type: ReactionType) -> Result<ToggleAction> {
        let mut conn = self.pool.get()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start reaction transaction")?;

        let delete = format!(
            "DELETE FROM reactions WHERE user_id = ? AND {} = ? AND type = ?",
            target_column(target)
        );
        let removed = tx
            .execute(&delete, (user_id.to_string(), target.id().to_string(), reaction_type.as_str()))
            .context("Failed to remove reaction")?;

        let action = if removed > 0 {
            ToggleAction::Removed
        } else {
            // A racing writer that already inserted the same row makes this a no-op
            let reaction = Reaction::new(*user_id, *target, reaction_type);
            tx.execute(INSERT_REACTION, insert_params(&reaction))
                .context("Failed to add reaction")?;
            ToggleAction::Added
        };

        tx.commit().context("Failed to commit reaction toggle")?;
        Ok(action)
    }

    /// Reaction counts per type; types nobody used are zero
    pub fn count_by_type(&self, target: &ReactionTarget) -> Result<ReactionCounts> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT type, COUNT(*) FROM reactions WHERE {} = ? GROUP BY type",
            target_column(target)
        );
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map([target.id().to_string()], |row| {
                Ok((row::parsed(row, 0, ReactionType::parse)?, row::count(row, 1)?))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to count reactions by type")?;

        Ok(rows
            .into_iter()
            .fold(ReactionCounts::default(), |counts, (reaction_type, n)| {
                counts.with_count(reaction_type, n)
            }))
    }

    /// Total reactions on a target
    pub fn count(&self, target: &ReactionTarget) -> Result<u64> {
        let conn = self.pool.get()?;
        let query = format!("SELECT COUNT(*) FROM reactions WHERE {} = ?", target_column(target));
        let total = conn
            .query_row(&query, [target.id().to_string()], |row| row::count(row, 0))
            .context("Failed to count reactions")?;
        Ok(total)
    }

    /// Reactions on a target with the reactor's display details, newest first
    pub fn find_for_target(&self, target: &ReactionTarget, limit: u64, offset: u64) -> Result<Vec<ReactionView>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT x.id, x.user_id, x.post_id, x.comment_id, x.type, x.created_at, u.username, u.avatar_url
             FROM reactions x
             JOIN users u ON u.id = x.user_id
             WHERE x.{} = ?
             ORDER BY x.created_at DESC, x.id DESC
             LIMIT ? OFFSET ?",
            target_column(target)
        );

        let mut stmt = conn.prepare(&query)?;
        let reactions = stmt
            .query_map(
                (
                    target.id().to_string(),
                    i64::try_from(limit).unwrap_or(i64::MAX),
                    i64::try_from(offset).unwrap_or(i64::MAX),
                ),
                |row| {
                    Ok(ReactionView {
                        reaction: map_reaction(row)?,
                        username: row.get(6)?,
                        avatar_url: row.get(7)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load reactions")?;
        Ok(reactions)
    }

    /// Reaction types a user has applied to a target
    pub fn user_types(&self, user_id: &Uuid, target: &ReactionTarget) -> Result<Vec<ReactionType>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT type FROM reactions WHERE user_id = ? AND {} = ?",
            target_column(target)
        );
        let mut stmt = conn.prepare(&query)?;
        let mut types = stmt
            .query_map((user_id.to_string(), target.id().to_string()), |row| {
                row::parsed(row, 0, ReactionType::parse)
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load user reactions")?;
        types.sort();
        Ok(types)
    }
}
