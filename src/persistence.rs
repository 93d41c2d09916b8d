//! # Workout Store
//!
//! SQLite-backed storage for the three collections the tracker keeps:
//!
//! 1. **workouts** - one row per generated plan, exercises kept as a JSON
//!    column, indexed on date and completion status.
//! 2. **history** - one row per calendar day (unique index on `date`),
//!    body parts and workout ids kept as JSON arrays.
//! 3. **settings** - a single row keyed by [`SETTINGS_ID`].
//!
//! The store is an explicit object with an open/close lifecycle. Components
//! that need persistence borrow it; there is no process-wide instance.
//!
//! Timestamps are written as RFC 3339 with a fixed nine-digit fraction and a
//! `Z` suffix, and days as `YYYY-MM-DD`, so string order in SQLite equals
//! chronological order and range queries can use the date indexes.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::{debug, info, warn};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult, Row, params};

use crate::error::{OptionExt, Result};
use crate::migrations;
use crate::types::{
    BodyPart, HistoryEntry, SETTINGS_ID, Theme, UserSettings, Workout, distinct_body_parts,
};

const WORKOUT_COLUMNS: &str =
    "id, date, prompt, exercises_json, notes, completed, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, date, body_parts_json, workout_ids_json";

const DAY_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Encoding Helpers
// ============================================================================

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e))
}

fn timestamp_column(row: &Row<'_>, column: usize) -> SqlResult<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn day_column(row: &Row<'_>, column: usize) -> SqlResult<NaiveDate> {
    let raw: String = row.get(column)?;
    NaiveDate::parse_from_str(&raw, DAY_FORMAT).map_err(|e| conversion_error(column, e))
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, column: usize) -> SqlResult<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(column, e))
}

fn workout_from_row(row: &Row<'_>) -> SqlResult<Workout> {
    Ok(Workout {
        id: row.get(0)?,
        date: timestamp_column(row, 1)?,
        prompt: row.get(2)?,
        exercises: json_column(row, 3)?,
        notes: row.get(4)?,
        completed: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
        updated_at: timestamp_column(row, 7)?,
    })
}

fn history_from_row(row: &Row<'_>) -> SqlResult<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        date: day_column(row, 1)?,
        body_parts: json_column(row, 2)?,
        workout_ids: json_column(row, 3)?,
    })
}

// ============================================================================
// Statement Helpers
// ============================================================================
//
// These take a plain `&Connection` so they run the same way against the
// store's connection or inside a transaction.

fn upsert_workout(conn: &Connection, workout: &Workout) -> Result<()> {
    let exercises_json = serde_json::to_string(&workout.exercises)?;
    conn.execute(
        "INSERT INTO workouts (id, date, prompt, exercises_json, notes, completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            date = excluded.date,
            prompt = excluded.prompt,
            exercises_json = excluded.exercises_json,
            notes = excluded.notes,
            completed = excluded.completed,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at",
        params![
            workout.id,
            format_timestamp(&workout.date),
            workout.prompt,
            exercises_json,
            workout.notes,
            workout.completed,
            format_timestamp(&workout.created_at),
            format_timestamp(&workout.updated_at),
        ],
    )?;
    Ok(())
}

fn upsert_history_row(conn: &Connection, entry: &HistoryEntry) -> Result<()> {
    let body_parts_json = serde_json::to_string(&entry.body_parts)?;
    let workout_ids_json = serde_json::to_string(&entry.workout_ids)?;
    conn.execute(
        "INSERT INTO history (id, date, body_parts_json, workout_ids_json)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            date = excluded.date,
            body_parts_json = excluded.body_parts_json,
            workout_ids_json = excluded.workout_ids_json",
        params![
            entry.id,
            format_day(entry.date),
            body_parts_json,
            workout_ids_json
        ],
    )?;
    Ok(())
}

fn find_history_by_date(conn: &Connection, date: NaiveDate) -> Result<Option<HistoryEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {} FROM history WHERE date = ?1", HISTORY_COLUMNS),
            params![format_day(date)],
            history_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// Write a history entry while keeping one row per calendar day.
///
/// Same id: the stored row is replaced. Different id on an occupied day:
/// the incoming entry is merged into the row that owns the day, and any
/// stale row under the incoming id (e.g. one that used to sit on another
/// day) is removed.
fn put_history(conn: &Connection, entry: &HistoryEntry) -> Result<HistoryEntry> {
    let mut incoming = entry.clone();
    incoming.body_parts = distinct_body_parts(entry.body_parts.iter().copied());

    let stored = match find_history_by_date(conn, incoming.date)? {
        Some(mut owner) if owner.id != incoming.id => {
            debug!(
                "[WorkoutStore] Merging history '{}' into '{}' for {}",
                incoming.id, owner.id, owner.date
            );
            owner.merge(&incoming);
            conn.execute("DELETE FROM history WHERE id = ?1", params![incoming.id])?;
            owner
        }
        _ => incoming,
    };

    upsert_history_row(conn, &stored)?;
    Ok(stored)
}

// ============================================================================
// Workout Store
// ============================================================================

/// Record counts per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreCounts {
    pub workouts: u32,
    pub history: u32,
    pub settings: u32,
}

/// Durable storage for workouts, daily history and settings.
pub struct WorkoutStore {
    db: Connection,
    db_path: String,
}

impl WorkoutStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open (or create) the database at `db_path` and bring its schema up to date.
    pub fn open(db_path: &str) -> Result<Self> {
        let mut db = Connection::open(db_path)?;
        migrations::apply(&mut db)?;
        info!("[WorkoutStore] Opened database at {}", db_path);

        Ok(Self {
            db,
            db_path: db_path.to_string(),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Close the underlying connection, reporting any error SQLite raises
    /// while flushing.
    pub fn close(self) -> Result<()> {
        let path = self.db_path;
        self.db.close().map_err(|(_, e)| {
            warn!("[WorkoutStore] Failed to close {}: {}", path, e);
            e
        })?;
        info!("[WorkoutStore] Closed database at {}", path);
        Ok(())
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<u32> {
            let n: u32 = self.db.query_row(
                &format!("SELECT COUNT(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            Ok(n)
        };

        Ok(StoreCounts {
            workouts: count("workouts")?,
            history: count("history")?,
            settings: count("settings")?,
        })
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Insert the default settings record unless one already exists.
    ///
    /// Returns `true` when a record was written.
    pub fn initialize_settings(&self) -> Result<bool> {
        let existing: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        if existing > 0 {
            debug!("[WorkoutStore] Settings already initialized");
            return Ok(false);
        }

        let defaults = UserSettings::default();
        self.db.execute(
            "INSERT INTO settings (id, theme, api_endpoint) VALUES (?1, ?2, ?3)",
            params![defaults.id, defaults.theme.as_str(), defaults.api_endpoint],
        )?;
        info!("[WorkoutStore] Created default settings");
        Ok(true)
    }

    pub fn get_settings(&self) -> Result<Option<UserSettings>> {
        let settings = self
            .db
            .query_row(
                "SELECT id, theme, api_endpoint FROM settings WHERE id = ?1",
                params![SETTINGS_ID],
                |row| {
                    let theme: String = row.get(1)?;
                    Ok(UserSettings {
                        id: row.get(0)?,
                        theme: theme.parse::<Theme>().unwrap_or_default(),
                        api_endpoint: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &UserSettings) -> Result<()> {
        self.db.execute(
            "INSERT INTO settings (id, theme, api_endpoint) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                theme = excluded.theme,
                api_endpoint = excluded.api_endpoint",
            params![settings.id, settings.theme.as_str(), settings.api_endpoint],
        )?;
        Ok(())
    }

    // ========================================================================
    // Workouts
    // ========================================================================

    /// Insert or replace the workout sharing `workout.id`.
    pub fn save_workout(&self, workout: &Workout) -> Result<()> {
        upsert_workout(&self.db, workout)?;
        debug!(
            "[WorkoutStore] Saved workout {} ({} exercises)",
            workout.id,
            workout.exercises.len()
        );
        Ok(())
    }

    /// All workouts, newest first. Equal dates are ordered by id descending.
    pub fn get_workouts(&self) -> Result<Vec<Workout>> {
        self.query_workouts(
            &format!(
                "SELECT {} FROM workouts ORDER BY date DESC, id DESC",
                WORKOUT_COLUMNS
            ),
            [],
        )
    }

    /// Workouts with `start <= date <= end`, oldest first.
    pub fn get_workouts_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Workout>> {
        self.query_workouts(
            &format!(
                "SELECT {} FROM workouts WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC, id ASC",
                WORKOUT_COLUMNS
            ),
            params![format_timestamp(&start), format_timestamp(&end)],
        )
    }

    pub fn get_workouts_by_completion(&self, completed: bool) -> Result<Vec<Workout>> {
        self.query_workouts(
            &format!(
                "SELECT {} FROM workouts WHERE completed = ?1 ORDER BY date DESC, id DESC",
                WORKOUT_COLUMNS
            ),
            params![completed],
        )
    }

    pub fn get_workout(&self, id: &str) -> Result<Option<Workout>> {
        let workout = self
            .db
            .query_row(
                &format!("SELECT {} FROM workouts WHERE id = ?1", WORKOUT_COLUMNS),
                params![id],
                workout_from_row,
            )
            .optional()?;
        Ok(workout)
    }

    /// The most recent workout, if any.
    pub fn latest_workout(&self) -> Result<Option<Workout>> {
        let workout = self
            .db
            .query_row(
                &format!(
                    "SELECT {} FROM workouts ORDER BY date DESC, id DESC LIMIT 1",
                    WORKOUT_COLUMNS
                ),
                [],
                workout_from_row,
            )
            .optional()?;
        Ok(workout)
    }

    /// Flip the completion flag and bump `updated_at`.
    pub fn set_workout_completed(&self, id: &str, completed: bool) -> Result<Workout> {
        let mut workout = self.get_workout(id)?.ok_or_missing("workouts", id)?;
        workout.completed = completed;
        workout.updated_at = Utc::now();
        upsert_workout(&self.db, &workout)?;
        info!(
            "[WorkoutStore] Marked workout {} completed={}",
            id, completed
        );
        Ok(workout)
    }

    fn query_workouts<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Workout>> {
        let mut stmt = self.db.prepare(sql)?;
        let workouts = stmt
            .query_map(params, workout_from_row)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(workouts)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Upsert a history entry by id, merging into the day's existing entry
    /// when another id already owns that day. Returns the row as stored.
    pub fn save_workout_history(&mut self, entry: &HistoryEntry) -> Result<HistoryEntry> {
        let tx = self.db.transaction()?;
        let stored = put_history(&tx, entry)?;
        tx.commit()?;
        Ok(stored)
    }

    /// All history entries, newest day first.
    pub fn get_workout_history(&self) -> Result<Vec<HistoryEntry>> {
        self.query_history(
            &format!("SELECT {} FROM history ORDER BY date DESC", HISTORY_COLUMNS),
            [],
        )
    }

    /// History entries with `start <= date <= end`, oldest first.
    pub fn get_history_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoryEntry>> {
        self.query_history(
            &format!(
                "SELECT {} FROM history WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC",
                HISTORY_COLUMNS
            ),
            params![format_day(start), format_day(end)],
        )
    }

    pub fn get_history_for_day(&self, date: NaiveDate) -> Result<Option<HistoryEntry>> {
        find_history_by_date(&self.db, date)
    }

    fn query_history<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.db.prepare(sql)?;
        let entries = stmt
            .query_map(params, history_from_row)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(entries)
    }

    // ========================================================================
    // Combined Writes
    // ========================================================================

    /// Persist a workout and its day's history entry in one transaction.
    ///
    /// Either both rows become visible or neither does.
    pub fn record_workout(
        &mut self,
        workout: &Workout,
        entry: &HistoryEntry,
    ) -> Result<HistoryEntry> {
        let tx = self.db.transaction()?;
        upsert_workout(&tx, workout)?;
        let stored = put_history(&tx, entry)?;
        tx.commit()?;

        info!(
            "[WorkoutStore] Recorded workout {} on {} ({} body parts that day)",
            workout.id,
            stored.date,
            stored.body_parts.len()
        );
        Ok(stored)
    }

    /// Body parts recorded for `date`, empty when nothing was logged.
    pub fn body_parts_on(&self, date: NaiveDate) -> Result<Vec<BodyPart>> {
        Ok(self
            .get_history_for_day(date)?
            .map(|entry| entry.body_parts)
            .unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::types::Exercise;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    fn sample_workout(id: &str, date: DateTime<Utc>) -> Workout {
        Workout {
            id: id.to_string(),
            date,
            prompt: Some("upper body".to_string()),
            exercises: vec![
                Exercise::new(format!("{}-0", id), "Bench Press", BodyPart::Chest),
                Exercise::new(format!("{}-1", id), "Curl", BodyPart::Arms),
            ],
            notes: None,
            completed: false,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_create_store() {
        let store = WorkoutStore::in_memory().unwrap();
        let counts = store.counts().unwrap();
        assert_eq!(
            counts,
            StoreCounts {
                workouts: 0,
                history: 0,
                settings: 0
            }
        );
    }

    #[test]
    fn test_initialize_settings_is_idempotent() {
        let store = WorkoutStore::in_memory().unwrap();
        assert!(store.initialize_settings().unwrap());
        assert!(!store.initialize_settings().unwrap());
        assert_eq!(store.counts().unwrap().settings, 1);
        assert_eq!(store.get_settings().unwrap(), Some(UserSettings::default()));
    }

    #[test]
    fn test_initialize_settings_leaves_existing_untouched() {
        let store = WorkoutStore::in_memory().unwrap();
        let custom = UserSettings {
            theme: Theme::Light,
            api_endpoint: "http://localhost:9000/api".to_string(),
            ..UserSettings::default()
        };
        store.save_settings(&custom).unwrap();

        assert!(!store.initialize_settings().unwrap());
        assert_eq!(store.get_settings().unwrap(), Some(custom));
    }

    #[test]
    fn test_save_and_get_workout() {
        let store = WorkoutStore::in_memory().unwrap();
        let workout = sample_workout("w1", ts(2024, 6, 15, 9));
        store.save_workout(&workout).unwrap();

        let loaded = store.get_workout("w1").unwrap().unwrap();
        assert_eq!(loaded, workout);
        assert!(store.get_workout("missing").unwrap().is_none());
    }

    #[test]
    fn test_save_workout_upserts_by_id() {
        let store = WorkoutStore::in_memory().unwrap();
        let mut workout = sample_workout("w1", ts(2024, 6, 15, 9));
        store.save_workout(&workout).unwrap();

        workout.prompt = Some("legs instead".to_string());
        workout.exercises.truncate(1);
        store.save_workout(&workout).unwrap();

        let all = store.get_workouts().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].prompt.as_deref(), Some("legs instead"));
        assert_eq!(all[0].exercises.len(), 1);
    }

    #[test]
    fn test_get_workouts_newest_first() {
        let store = WorkoutStore::in_memory().unwrap();
        store
            .save_workout(&sample_workout("b", ts(2024, 6, 15, 9)))
            .unwrap();
        store
            .save_workout(&sample_workout("c", ts(2024, 6, 20, 9)))
            .unwrap();
        store
            .save_workout(&sample_workout("a", ts(2024, 1, 1, 9)))
            .unwrap();

        let ids: Vec<String> = store
            .get_workouts()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(store.latest_workout().unwrap().unwrap().id, "c");
    }

    #[test]
    fn test_get_workouts_equal_dates_are_stable() {
        let store = WorkoutStore::in_memory().unwrap();
        let date = ts(2024, 6, 15, 9);
        for id in ["w2", "w3", "w1"] {
            store.save_workout(&sample_workout(id, date)).unwrap();
        }

        let first: Vec<String> = store
            .get_workouts()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        let second: Vec<String> = store
            .get_workouts()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(first, vec!["w3", "w2", "w1"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sub_millisecond_timestamps_round_trip() {
        let store = WorkoutStore::in_memory().unwrap();
        let base = ts(2024, 6, 15, 9);
        let later = base + chrono::Duration::nanoseconds(900_123);
        let earlier = base + chrono::Duration::nanoseconds(400_001);

        // Same millisecond; the id order would put "z" first if precision were lost.
        store.save_workout(&sample_workout("a", later)).unwrap();
        store.save_workout(&sample_workout("z", earlier)).unwrap();

        let ids: Vec<String> = store
            .get_workouts()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec!["a", "z"]);

        let loaded = store.get_workout("a").unwrap().unwrap();
        assert_eq!(loaded, sample_workout("a", later));
        assert_eq!(loaded.date.timestamp_subsec_nanos(), 900_123);
    }

    #[test]
    fn test_workouts_by_date_range_is_inclusive() {
        let store = WorkoutStore::in_memory().unwrap();
        store
            .save_workout(&sample_workout("before", ts(2024, 5, 31, 23)))
            .unwrap();
        store
            .save_workout(&sample_workout("start", ts(2024, 6, 1, 0)))
            .unwrap();
        store
            .save_workout(&sample_workout("middle", ts(2024, 6, 10, 12)))
            .unwrap();
        store
            .save_workout(&sample_workout("end", ts(2024, 6, 30, 0)))
            .unwrap();
        store
            .save_workout(&sample_workout("after", ts(2024, 6, 30, 1)))
            .unwrap();

        let ids: Vec<String> = store
            .get_workouts_by_date_range(ts(2024, 6, 1, 0), ts(2024, 6, 30, 0))
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec!["start", "middle", "end"]);
    }

    #[test]
    fn test_completion_flag() {
        let store = WorkoutStore::in_memory().unwrap();
        store
            .save_workout(&sample_workout("w1", ts(2024, 6, 15, 9)))
            .unwrap();
        store
            .save_workout(&sample_workout("w2", ts(2024, 6, 16, 9)))
            .unwrap();

        let updated = store.set_workout_completed("w1", true).unwrap();
        assert!(updated.completed);
        assert!(updated.updated_at > updated.created_at);

        let done = store.get_workouts_by_completion(true).unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, "w1");
        assert_eq!(store.get_workouts_by_completion(false).unwrap()[0].id, "w2");

        assert!(matches!(
            store.set_workout_completed("nope", true),
            Err(TrackerError::Storage { .. })
        ));
    }

    #[test]
    fn test_history_round_trip_keeps_body_part_order() {
        let mut store = WorkoutStore::in_memory().unwrap();
        let entry = HistoryEntry::new(
            "h1",
            day("2024-06-15"),
            vec![BodyPart::Chest, BodyPart::Arms],
            vec!["w1".to_string()],
        );
        store.save_workout_history(&entry).unwrap();

        let loaded = store.get_history_for_day(day("2024-06-15")).unwrap().unwrap();
        assert_eq!(loaded.body_parts, vec![BodyPart::Chest, BodyPart::Arms]);
        assert_eq!(
            store.body_parts_on(day("2024-06-16")).unwrap(),
            Vec::<BodyPart>::new()
        );
    }

    #[test]
    fn test_history_same_id_overwrites() {
        let mut store = WorkoutStore::in_memory().unwrap();
        let mut entry = HistoryEntry::new(
            "h1",
            day("2024-06-15"),
            vec![BodyPart::Chest],
            vec!["w1".to_string()],
        );
        store.save_workout_history(&entry).unwrap();

        entry.body_parts = vec![BodyPart::Legs];
        entry.workout_ids = vec!["w9".to_string()];
        store.save_workout_history(&entry).unwrap();

        let history = store.get_workout_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].body_parts, vec![BodyPart::Legs]);
        assert_eq!(history[0].workout_ids, vec!["w9".to_string()]);
    }

    #[test]
    fn test_history_same_day_different_id_merges() {
        let mut store = WorkoutStore::in_memory().unwrap();
        store
            .save_workout_history(&HistoryEntry::new(
                "h1",
                day("2024-06-15"),
                vec![BodyPart::Chest, BodyPart::Arms],
                vec!["w1".to_string()],
            ))
            .unwrap();
        let stored = store
            .save_workout_history(&HistoryEntry::new(
                "h2",
                day("2024-06-15"),
                vec![BodyPart::Legs, BodyPart::Chest],
                vec!["w2".to_string()],
            ))
            .unwrap();

        assert_eq!(stored.id, "h1");
        let history = store.get_workout_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history[0].body_parts,
            vec![BodyPart::Chest, BodyPart::Arms, BodyPart::Legs]
        );
        assert_eq!(
            history[0].workout_ids,
            vec!["w1".to_string(), "w2".to_string()]
        );
    }

    #[test]
    fn test_history_moving_entry_onto_occupied_day_merges() {
        let mut store = WorkoutStore::in_memory().unwrap();
        store
            .save_workout_history(&HistoryEntry::new(
                "h1",
                day("2024-06-15"),
                vec![BodyPart::Chest],
                vec!["w1".to_string()],
            ))
            .unwrap();
        store
            .save_workout_history(&HistoryEntry::new(
                "h2",
                day("2024-06-16"),
                vec![BodyPart::Back],
                vec!["w2".to_string()],
            ))
            .unwrap();

        // h2 re-dated onto h1's day
        store
            .save_workout_history(&HistoryEntry::new(
                "h2",
                day("2024-06-15"),
                vec![BodyPart::Back],
                vec!["w2".to_string()],
            ))
            .unwrap();

        let history = store.get_workout_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "h1");
        assert_eq!(history[0].body_parts, vec![BodyPart::Chest, BodyPart::Back]);
    }

    #[test]
    fn test_history_ordering_and_range() {
        let mut store = WorkoutStore::in_memory().unwrap();
        for (id, d) in [
            ("h1", "2024-06-01"),
            ("h2", "2024-06-15"),
            ("h3", "2024-05-31"),
            ("h4", "2024-06-30"),
        ] {
            store
                .save_workout_history(&HistoryEntry::new(
                    id,
                    day(d),
                    vec![BodyPart::Core],
                    vec![],
                ))
                .unwrap();
        }

        let all: Vec<String> = store
            .get_workout_history()
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(all, vec!["h4", "h2", "h1", "h3"]);

        let june: Vec<String> = store
            .get_history_by_date_range(day("2024-06-01"), day("2024-06-15"))
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(june, vec!["h1", "h2"]);
    }

    #[test]
    fn test_record_workout_writes_both_rows() {
        let mut store = WorkoutStore::in_memory().unwrap();
        let workout = sample_workout("w1", ts(2024, 6, 15, 9));
        let entry = HistoryEntry::new(
            HistoryEntry::id_for_day(day("2024-06-15")),
            day("2024-06-15"),
            workout.body_parts(),
            vec![workout.id.clone()],
        );

        store.record_workout(&workout, &entry).unwrap();

        let counts = store.counts().unwrap();
        assert_eq!(counts.workouts, 1);
        assert_eq!(counts.history, 1);
    }

    #[test]
    fn test_record_workout_rolls_back_on_history_failure() {
        let mut store = WorkoutStore::in_memory().unwrap();
        store.db.execute_batch("DROP TABLE history").unwrap();

        let workout = sample_workout("w1", ts(2024, 6, 15, 9));
        let entry = HistoryEntry::new(
            "h1",
            day("2024-06-15"),
            workout.body_parts(),
            vec![workout.id.clone()],
        );

        let result = store.record_workout(&workout, &entry);
        assert!(matches!(result, Err(TrackerError::Storage { .. })));
        assert!(store.get_workout("w1").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let store = WorkoutStore::in_memory().unwrap();
        store
            .db
            .execute(
                "INSERT INTO history (id, date, body_parts_json, workout_ids_json)
                 VALUES ('bad', '2024-06-15', 'not json', '[]')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get_workout_history(),
            Err(TrackerError::Storage { .. })
        ));
    }

    #[test]
    fn test_close() {
        let store = WorkoutStore::in_memory().unwrap();
        assert_eq!(store.path(), ":memory:");
        store.close().unwrap();
    }
}
