use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use stride_types::Run;

use crate::db::row::{self, encode_time};
use crate::db::DbPool;

/// Read/insert access to runs. Runs are never updated once recorded.
pub struct RunRepository {
    pool: DbPool,
}

const RUN_COLUMNS: &str = "r.id, r.user_id, r.distance_meters, r.duration_seconds,
                           r.pace_seconds_per_km, r.route, r.started_at, r.created_at";

fn map_run(row: &Row<'_>) -> rusqlite::Result<Run> {
    Ok(Run {
        id: row::uuid(row, 0)?,
        user_id: row::uuid(row, 1)?,
        distance_meters: row.get(2)?,
        duration_seconds: row.get(3)?,
        pace_seconds_per_km: row.get(4)?,
        route: row.get(5)?,
        started_at: row::time(row, 6)?,
        created_at: row::time(row, 7)?,
    })
}

impl RunRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a new run
    pub fn create(&self, run: &Run) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO runs (id, user_id, distance_meters, duration_seconds, pace_seconds_per_km, route, started_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                run.id.to_string(),
                run.user_id.to_string(),
                run.distance_meters,
                run.duration_seconds,
                run.pace_seconds_per_km,
                &run.route,
                encode_time(&run.started_at),
                encode_time(&run.created_at),
            ),
        )
        .context("Failed to create run")?;
        Ok(())
    }

    /// The run attached to a post, if any
    pub fn find_by_post_id(&self, post_id: &Uuid) -> Result<Option<Run>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {RUN_COLUMNS}
             FROM runs r
             JOIN posts p ON p.run_id = r.id
             WHERE p.id = ?"
        );
        let run = conn
            .query_row(&query, [post_id.to_string()], map_run)
            .optional()
            .context("Failed to load run for post")?;
        Ok(run)
    }
}
