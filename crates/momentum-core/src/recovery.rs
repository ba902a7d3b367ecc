//! Once-a-week retroactive repair of a missed day.
//!
//! Recovery lets a user who missed yesterday keep their streak alive by
//! writing a short reflection about the missed day. The reflection is
//! backdated to yesterday and the streak advances as if yesterday had been
//! completed. The privilege is rate-limited to once per rolling week,
//! tracked through `last_recovery_date` on the stats aggregate.

use chrono::Utc;

use crate::day::DayKey;
use crate::error::{CoreError, Result, StorageError};
use crate::events::{Event, NoopTelemetry, Telemetry};
use crate::storage::{Database, Reflection, ReflectionDraft, StatsSnapshot};
use crate::streak;

/// Minimum days between recoveries.
pub const RECOVERY_INTERVAL_DAYS: i64 = 7;

/// Companion text stored alongside the user's recovery reflection.
pub const RECOVERY_EMBODIED_TEXT: &str = "Showed up with intention to maintain momentum";
pub const RECOVERY_GRATEFUL_TEXT: &str =
    "Grateful for the opportunity to restart and continue growing";

/// Result of a successful recovery.
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    /// The reflection backdated to the missed day.
    pub reflection: Reflection,
    pub stats: StatsSnapshot,
}

/// Applies the grace-period streak restoration rules.
pub struct RecoveryPolicy<'a> {
    db: &'a Database,
    telemetry: &'a dyn Telemetry,
}

impl<'a> RecoveryPolicy<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            telemetry: &NoopTelemetry,
        }
    }

    pub fn with_telemetry(db: &'a Database, telemetry: &'a dyn Telemetry) -> Self {
        Self { db, telemetry }
    }

    /// Whether recovery is currently permitted by the weekly gate.
    pub fn available(&self, user_id: &str, today: DayKey) -> Result<bool> {
        let stats = self.db.user_stats(user_id)?;
        Ok(match stats.last_recovery_date {
            Some(last) => today.days_since(last) >= RECOVERY_INTERVAL_DAYS,
            None => true,
        })
    }

    /// Recover yesterday's missed day with a reflection on it.
    ///
    /// The reflection is stored under yesterday's date and the streak
    /// advances anchored to yesterday, so a completion later `today`
    /// continues it normally.
    ///
    /// # Errors
    ///
    /// - [`CoreError::RecoveryRequiresReflection`] if `well_done` is blank
    /// - [`CoreError::RecoveryAlreadyUsedThisWeek`] inside the weekly gate
    /// - [`CoreError::NothingToRecover`] if the last completion is
    ///   yesterday or today, so there is no gap to repair
    /// - [`CoreError::AlreadyCompletedToday`] if yesterday already has a
    ///   reflection
    ///
    /// A rejected attempt persists nothing and does not consume the
    /// weekly allowance.
    pub fn recover_streak(
        &self,
        user_id: &str,
        today: DayKey,
        well_done: &str,
    ) -> Result<RecoveryOutcome> {
        let well_done = well_done.trim();
        if well_done.is_empty() {
            return Err(CoreError::RecoveryRequiresReflection);
        }

        let before = self.db.user_stats(user_id)?;
        if let Some(last) = before.last_recovery_date {
            if today.days_since(last) < RECOVERY_INTERVAL_DAYS {
                return Err(CoreError::RecoveryAlreadyUsedThisWeek { last_used: last });
            }
        }

        let yesterday = today.yesterday();
        if let Some(last) = before.last_completion_date {
            // Recovery only repairs an actual gap. With the last
            // completion on yesterday or today the chain is intact and
            // the advance below would be a no-op.
            if yesterday.days_since(last) < 1 {
                return Err(CoreError::NothingToRecover);
            }
        }

        let draft = ReflectionDraft {
            well_done: Some(well_done.to_string()),
            embodied: Some(RECOVERY_EMBODIED_TEXT.to_string()),
            grateful: Some(RECOVERY_GRATEFUL_TEXT.to_string()),
        };
        let reflection = match self.db.create_reflection(user_id, yesterday, &draft) {
            Ok(reflection) => reflection,
            Err(StorageError::DuplicateDay) => {
                return Err(CoreError::AlreadyCompletedToday { date: yesterday })
            }
            Err(e) => return Err(e.into()),
        };

        let (mut patch, _) = streak::advance(&before, yesterday);
        patch.last_recovery_date = Some(Some(today));
        let stats = self.db.update_user_stats(user_id, &patch)?;

        log::info!(
            "streak recovered for {user_id}: {} day(s) as of {yesterday}",
            stats.current_streak
        );
        self.telemetry.emit(&Event::RecoveryApplied {
            user_id: user_id.to_string(),
            recovered_date: yesterday,
            restored_streak: stats.current_streak,
            at: Utc::now(),
        });
        Ok(RecoveryOutcome { reflection, stats })
    }
}
