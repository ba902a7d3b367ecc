//! Day-uniqueness gate and streak trigger.
//!
//! All record submissions go through [`CompletionGuard`]. It is the only
//! code path that advances the streak: one successful morning entry per
//! calendar day mutates the aggregate, everything else is rejected or
//! stored without touching it. Reflections share the per-day uniqueness
//! rule but never change streak state.
//!
//! Duplicate detection rides on the storage unique index, so two
//! concurrent sessions racing on the same day cannot both count: the
//! losing insert fails before any streak mutation happens.

use chrono::Utc;

use crate::day::DayKey;
use crate::error::{CoreError, Result, StorageError};
use crate::events::{Event, NoopTelemetry, Telemetry};
use crate::storage::{Database, MorningDraft, MorningEntry, Reflection, ReflectionDraft, StatsSnapshot};
use crate::streak;

/// Longest accepted free-text field, in characters.
const MAX_TEXT_LEN: usize = 2000;

/// Result of a successful morning completion.
#[derive(Debug, Clone)]
pub struct MorningOutcome {
    pub entry: MorningEntry,
    pub stats: StatsSnapshot,
    /// The new streak length is a celebration day.
    pub milestone: bool,
}

/// Enforces at-most-one record per user per calendar day and triggers
/// streak advancement on morning completion.
pub struct CompletionGuard<'a> {
    db: &'a Database,
    telemetry: &'a dyn Telemetry,
}

impl<'a> CompletionGuard<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            telemetry: &NoopTelemetry,
        }
    }

    pub fn with_telemetry(db: &'a Database, telemetry: &'a dyn Telemetry) -> Self {
        Self { db, telemetry }
    }

    /// Record a finished morning routine for `date` and advance the streak.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyCompletedToday`] if a morning entry for that day
    /// exists. The stored entry and the aggregate are left untouched in
    /// that case.
    pub fn complete_morning(
        &self,
        user_id: &str,
        date: DayKey,
        draft: &MorningDraft,
    ) -> Result<MorningOutcome> {
        let draft = normalize_morning(draft)?;
        let entry = match self.db.create_morning_entry(user_id, date, &draft) {
            Ok(entry) => entry,
            Err(StorageError::DuplicateDay) => {
                return Err(CoreError::AlreadyCompletedToday { date })
            }
            Err(e) => return Err(e.into()),
        };

        let before = self.db.user_stats(user_id)?;
        let (patch, change) = streak::advance(&before, date);
        if change == streak::StreakChange::Reset && before.current_streak > 0 {
            self.telemetry.emit(&Event::StreakReset {
                user_id: user_id.to_string(),
                previous_streak: before.current_streak,
                at: Utc::now(),
            });
        }
        let stats = self.db.update_user_stats(user_id, &patch)?;
        let milestone = streak::is_milestone(stats.current_streak);
        self.telemetry.emit(&Event::MorningCompleted {
            user_id: user_id.to_string(),
            date,
            current_streak: stats.current_streak,
            total_completions: stats.total_completions,
            milestone,
            at: Utc::now(),
        });
        Ok(MorningOutcome {
            entry,
            stats,
            milestone,
        })
    }

    /// Record an evening reflection for `date`.
    ///
    /// Reflections never touch the streak aggregate.
    ///
    /// # Errors
    ///
    /// [`CoreError::AlreadyCompletedToday`] if a reflection for that day
    /// exists.
    pub fn record_reflection(
        &self,
        user_id: &str,
        date: DayKey,
        draft: &ReflectionDraft,
    ) -> Result<Reflection> {
        let draft = normalize_reflection(draft)?;
        let reflection = match self.db.create_reflection(user_id, date, &draft) {
            Ok(reflection) => reflection,
            Err(StorageError::DuplicateDay) => {
                return Err(CoreError::AlreadyCompletedToday { date })
            }
            Err(e) => return Err(e.into()),
        };
        self.telemetry.emit(&Event::ReflectionRecorded {
            user_id: user_id.to_string(),
            date,
            at: Utc::now(),
        });
        Ok(reflection)
    }

    /// Whether a morning entry already exists for `date`.
    pub fn completed_on(&self, user_id: &str, date: DayKey) -> Result<bool> {
        Ok(self.db.morning_entry_by_date(user_id, date)?.is_some())
    }
}

fn clean(field: &str, value: &Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > MAX_TEXT_LEN {
                return Err(CoreError::InvalidRecord(format!(
                    "{field} exceeds {MAX_TEXT_LEN} characters"
                )));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn normalize_morning(draft: &MorningDraft) -> Result<MorningDraft> {
    Ok(MorningDraft {
        identity: clean("identity", &draft.identity)?,
        feeling: clean("feeling", &draft.feeling)?,
        action: clean("action", &draft.action)?,
        replace_pattern: clean("replace_pattern", &draft.replace_pattern)?,
        why_today_matters: clean("why_today_matters", &draft.why_today_matters)?,
        ..draft.clone()
    })
}

fn normalize_reflection(draft: &ReflectionDraft) -> Result<ReflectionDraft> {
    Ok(ReflectionDraft {
        well_done: clean("well_done", &draft.well_done)?,
        embodied: clean("embodied", &draft.embodied)?,
        grateful: clean("grateful", &draft.grateful)?,
    })
}
