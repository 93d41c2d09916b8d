use log::info;
use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

use crate::error::{Result, TrackerError};

/// Initial schema: three collections keyed by `id`, with the date and
/// completion indexes the queries rely on.
const SCHEMA_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS workouts (
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        prompt TEXT,
        exercises_json TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS history (
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        body_parts_json TEXT NOT NULL,
        workout_ids_json TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
        id TEXT PRIMARY KEY,
        theme TEXT NOT NULL,
        api_endpoint TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_workouts_date ON workouts(date);
    CREATE INDEX IF NOT EXISTS idx_workouts_completed ON workouts(completed);
    CREATE INDEX IF NOT EXISTS idx_workouts_created_at ON workouts(created_at);
    CREATE UNIQUE INDEX IF NOT EXISTS idx_history_date ON history(date);
"#;

/// Plan notes returned by the generator alongside the exercises.
const ADD_WORKOUT_NOTES: &str = "ALTER TABLE workouts ADD COLUMN notes TEXT;";

/// Timestamps used to be written with a three-digit fraction. Pad them to
/// nine digits so they sort correctly next to rows written since.
const WIDEN_TIMESTAMPS: &str = r#"
    UPDATE workouts SET date = substr(date, 1, 23) || '000000Z'
        WHERE length(date) = 24;
    UPDATE workouts SET created_at = substr(created_at, 1, 23) || '000000Z'
        WHERE length(created_at) = 24;
    UPDATE workouts SET updated_at = substr(updated_at, 1, 23) || '000000Z'
        WHERE length(updated_at) = 24;
"#;

/// All schema versions, oldest first. Only ever append to this list so
/// existing databases keep their records across upgrades.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(SCHEMA_V1),
        M::up(ADD_WORKOUT_NOTES),
        M::up(WIDEN_TIMESTAMPS),
    ])
}

/// Number of schema versions this build knows about.
pub const LATEST_VERSION: usize = 3;

/// Read the schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> Result<usize> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version.max(0) as usize)
}

/// Bring the database up to the latest schema.
///
/// Fails with a storage error when the file was written by a newer build.
pub fn apply(conn: &mut Connection) -> Result<()> {
    let before = schema_version(conn)?;
    if before > LATEST_VERSION {
        return Err(TrackerError::storage(format!(
            "database schema version {} is newer than supported version {}",
            before, LATEST_VERSION
        )));
    }
    if before == LATEST_VERSION {
        return Ok(());
    }

    info!(
        "[Migrations] Upgrading schema from version {} to {}",
        before, LATEST_VERSION
    );
    migrations().to_latest(conn)?;
    info!("[Migrations] Schema is at version {}", LATEST_VERSION);

    Ok(())
}
