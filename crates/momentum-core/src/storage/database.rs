//! SQLite-backed record store.
//!
//! Provides persistent storage for the three record kinds:
//! - Daily morning entries (at most one per user per calendar day)
//! - Daily reflections (same uniqueness, tracked independently)
//! - Per-user stats aggregates (streak, lifetime completions)
//!
//! Day-uniqueness is enforced by unique indexes, so the check-then-create
//! sequence in the completion guard cannot race across sessions: the losing
//! insert fails with [`StorageError::DuplicateDay`] before any streak
//! mutation happens. No cross-record transactions are needed beyond that.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::day::DayKey;
use crate::error::{CoreError, StorageError};

/// A persisted morning entry. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorningEntry {
    pub id: i64,
    pub user_id: String,
    pub date: DayKey,
    pub identity: Option<String>,
    pub feeling: Option<String>,
    pub action: Option<String>,
    pub replace_pattern: Option<String>,
    pub why_today_matters: Option<String>,
    pub starter_suggestion_used: bool,
    pub drank_water: bool,
    pub exposed_to_light: bool,
    pub moved_body: bool,
    pub timer_completed: bool,
    pub visualization_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new morning entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MorningDraft {
    pub identity: Option<String>,
    pub feeling: Option<String>,
    pub action: Option<String>,
    pub replace_pattern: Option<String>,
    pub why_today_matters: Option<String>,
    pub starter_suggestion_used: bool,
    pub drank_water: bool,
    pub exposed_to_light: bool,
    pub moved_body: bool,
    pub timer_completed: bool,
    pub visualization_completed: bool,
}

/// A persisted reflection. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    pub id: i64,
    pub user_id: String,
    pub date: DayKey,
    pub well_done: Option<String>,
    pub embodied: Option<String>,
    pub grateful: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new reflection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReflectionDraft {
    pub well_done: Option<String>,
    pub embodied: Option<String>,
    pub grateful: Option<String>,
}

/// The per-user stats aggregate.
///
/// Mutated only by the streak calculator and recovery policy, always
/// through [`Database::update_user_stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub user_id: String,
    pub current_streak: u32,
    pub total_completions: u64,
    pub last_completion_date: Option<DayKey>,
    pub last_recovery_date: Option<DayKey>,
}

impl StatsSnapshot {
    /// The aggregate a user starts with before any completion.
    pub fn fresh(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            current_streak: 0,
            total_completions: 0,
            last_completion_date: None,
            last_recovery_date: None,
        }
    }
}

/// Partial update for the stats aggregate. Fields left as `None` keep
/// their stored value (merge semantics).
#[derive(Debug, Clone, Default)]
pub struct StatsPatch {
    pub current_streak: Option<u32>,
    pub total_completions: Option<u64>,
    pub last_completion_date: Option<Option<DayKey>>,
    pub last_recovery_date: Option<Option<DayKey>>,
}

/// SQLite database for daily records and per-user stats.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/momentum/momentum.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("momentum.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (and migrate) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS morning_entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                date        TEXT NOT NULL,
                identity    TEXT,
                feeling     TEXT,
                action      TEXT,
                replace_pattern TEXT,
                why_today_matters TEXT,
                starter_suggestion_used INTEGER NOT NULL DEFAULT 0,
                drank_water INTEGER NOT NULL DEFAULT 0,
                exposed_to_light INTEGER NOT NULL DEFAULT 0,
                moved_body  INTEGER NOT NULL DEFAULT 0,
                timer_completed INTEGER NOT NULL DEFAULT 0,
                visualization_completed INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL,
                UNIQUE(user_id, date)
            );

            CREATE TABLE IF NOT EXISTS reflections (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL,
                date        TEXT NOT NULL,
                well_done   TEXT,
                embodied    TEXT,
                grateful    TEXT,
                created_at  TEXT NOT NULL,
                UNIQUE(user_id, date)
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                user_id             TEXT PRIMARY KEY,
                current_streak      INTEGER NOT NULL DEFAULT 0,
                total_completions   INTEGER NOT NULL DEFAULT 0,
                last_completion_date TEXT,
                last_recovery_date  TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_morning_entries_date ON morning_entries(date);
            CREATE INDEX IF NOT EXISTS idx_reflections_date ON reflections(date);",
        )?;
        Ok(())
    }

    /// Insert a morning entry for `(user_id, date)`.
    ///
    /// # Errors
    /// Returns [`StorageError::DuplicateDay`] if an entry already exists
    /// for that day. No other row is touched in that case.
    pub fn create_morning_entry(
        &self,
        user_id: &str,
        date: DayKey,
        draft: &MorningDraft,
    ) -> Result<MorningEntry, StorageError> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO morning_entries (
                user_id, date, identity, feeling, action, replace_pattern,
                why_today_matters, starter_suggestion_used, drank_water,
                exposed_to_light, moved_body, timer_completed,
                visualization_completed, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                user_id,
                date.to_string(),
                draft.identity,
                draft.feeling,
                draft.action,
                draft.replace_pattern,
                draft.why_today_matters,
                draft.starter_suggestion_used,
                draft.drank_water,
                draft.exposed_to_light,
                draft.moved_body,
                draft.timer_completed,
                draft.visualization_completed,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(MorningEntry {
            id,
            user_id: user_id.to_string(),
            date,
            identity: draft.identity.clone(),
            feeling: draft.feeling.clone(),
            action: draft.action.clone(),
            replace_pattern: draft.replace_pattern.clone(),
            why_today_matters: draft.why_today_matters.clone(),
            starter_suggestion_used: draft.starter_suggestion_used,
            drank_water: draft.drank_water,
            exposed_to_light: draft.exposed_to_light,
            moved_body: draft.moved_body,
            timer_completed: draft.timer_completed,
            visualization_completed: draft.visualization_completed,
            created_at,
        })
    }

    pub fn morning_entry_by_date(
        &self,
        user_id: &str,
        date: DayKey,
    ) -> Result<Option<MorningEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, identity, feeling, action, replace_pattern,
                    why_today_matters, starter_suggestion_used, drank_water,
                    exposed_to_light, moved_body, timer_completed,
                    visualization_completed, created_at
             FROM morning_entries WHERE user_id = ?1 AND date = ?2",
        )?;
        let result = stmt.query_row(params![user_id, date.to_string()], row_to_morning_entry);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_morning_entries(&self, user_id: &str) -> Result<Vec<MorningEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, identity, feeling, action, replace_pattern,
                    why_today_matters, starter_suggestion_used, drank_water,
                    exposed_to_light, moved_body, timer_completed,
                    visualization_completed, created_at
             FROM morning_entries WHERE user_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_morning_entry)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Insert a reflection for `(user_id, date)`.
    ///
    /// # Errors
    /// Returns [`StorageError::DuplicateDay`] if one already exists.
    pub fn create_reflection(
        &self,
        user_id: &str,
        date: DayKey,
        draft: &ReflectionDraft,
    ) -> Result<Reflection, StorageError> {
        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO reflections (user_id, date, well_done, embodied, grateful, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                date.to_string(),
                draft.well_done,
                draft.embodied,
                draft.grateful,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Reflection {
            id,
            user_id: user_id.to_string(),
            date,
            well_done: draft.well_done.clone(),
            embodied: draft.embodied.clone(),
            grateful: draft.grateful.clone(),
            created_at,
        })
    }

    pub fn reflection_by_date(
        &self,
        user_id: &str,
        date: DayKey,
    ) -> Result<Option<Reflection>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, well_done, embodied, grateful, created_at
             FROM reflections WHERE user_id = ?1 AND date = ?2",
        )?;
        let result = stmt.query_row(params![user_id, date.to_string()], row_to_reflection);
        match result {
            Ok(reflection) => Ok(Some(reflection)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reflections with `start <= date <= end`, ordered by date.
    pub fn reflections_in_range(
        &self,
        user_id: &str,
        start: DayKey,
        end: DayKey,
    ) -> Result<Vec<Reflection>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, well_done, embodied, grateful, created_at
             FROM reflections
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt.query_map(
            params![user_id, start.to_string(), end.to_string()],
            row_to_reflection,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_reflections(&self, user_id: &str) -> Result<Vec<Reflection>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, date, well_done, embodied, grateful, created_at
             FROM reflections WHERE user_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_reflection)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Read the stats aggregate for a user, initializing to the fresh
    /// `{0, 0, none}` aggregate if none is stored yet.
    pub fn user_stats(&self, user_id: &str) -> Result<StatsSnapshot, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, current_streak, total_completions,
                    last_completion_date, last_recovery_date
             FROM user_stats WHERE user_id = ?1",
        )?;
        let result = stmt.query_row(params![user_id], row_to_stats);
        match result {
            Ok(stats) => Ok(stats),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(StatsSnapshot::fresh(user_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update to the stats aggregate.
    ///
    /// Fields present in the patch overwrite; absent fields are retained.
    /// Returns the merged aggregate as stored.
    pub fn update_user_stats(
        &self,
        user_id: &str,
        patch: &StatsPatch,
    ) -> Result<StatsSnapshot, StorageError> {
        let mut stats = self.user_stats(user_id)?;
        if let Some(streak) = patch.current_streak {
            stats.current_streak = streak;
        }
        if let Some(total) = patch.total_completions {
            stats.total_completions = total;
        }
        if let Some(date) = patch.last_completion_date {
            stats.last_completion_date = date;
        }
        if let Some(date) = patch.last_recovery_date {
            stats.last_recovery_date = date;
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO user_stats (
                user_id, current_streak, total_completions,
                last_completion_date, last_recovery_date
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                stats.current_streak,
                stats.total_completions,
                stats.last_completion_date.map(|d| d.to_string()),
                stats.last_recovery_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(stats)
    }

}

fn parse_day(idx: usize, value: String) -> Result<DayKey, rusqlite::Error> {
    value.parse().map_err(|e: chrono::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(idx: usize, value: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_morning_entry(row: &Row<'_>) -> Result<MorningEntry, rusqlite::Error> {
    Ok(MorningEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: parse_day(2, row.get(2)?)?,
        identity: row.get(3)?,
        feeling: row.get(4)?,
        action: row.get(5)?,
        replace_pattern: row.get(6)?,
        why_today_matters: row.get(7)?,
        starter_suggestion_used: row.get(8)?,
        drank_water: row.get(9)?,
        exposed_to_light: row.get(10)?,
        moved_body: row.get(11)?,
        timer_completed: row.get(12)?,
        visualization_completed: row.get(13)?,
        created_at: parse_timestamp(14, row.get(14)?)?,
    })
}

fn row_to_reflection(row: &Row<'_>) -> Result<Reflection, rusqlite::Error> {
    Ok(Reflection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: parse_day(2, row.get(2)?)?,
        well_done: row.get(3)?,
        embodied: row.get(4)?,
        grateful: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
    })
}

fn row_to_stats(row: &Row<'_>) -> Result<StatsSnapshot, rusqlite::Error> {
    let last_completion: Option<String> = row.get(3)?;
    let last_recovery: Option<String> = row.get(4)?;
    Ok(StatsSnapshot {
        user_id: row.get(0)?,
        current_streak: row.get(1)?,
        total_completions: row.get(2)?,
        last_completion_date: last_completion.map(|s| parse_day(3, s)).transpose()?,
        last_recovery_date: last_recovery.map(|s| parse_day(4, s)).transpose()?,
    })
}
