//! Per-session routine state machine.
//!
//! One [`RoutineSequencer`] exists per active sitting. It walks the user
//! through the routine steps and talks to the completion guard only at
//! transition points; everything between transitions is presentational and
//! owned by the caller.
//!
//! Command semantics: a command issued from a non-matching step is ignored
//! and leaves the state unchanged. Storage failures surface to the caller
//! without advancing the machine. `AlreadyCompletedToday` is informational,
//! the machine advances as if the submission had succeeded (without a
//! celebration). Abandoning a session writes nothing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::day::DayKey;
use crate::error::{CoreError, Result};
use crate::events::{Event, NoopTelemetry, Telemetry};
use crate::guard::{CompletionGuard, MorningOutcome};
use crate::storage::{Database, MorningDraft, PreferredMode, ReflectionDraft};

/// The named steps of one sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineStep {
    /// One-time first-run prefix; skipped once the onboarded flag is set.
    Onboarding,
    Welcome,
    Breathe,
    /// Shortened sitting that jumps straight to completion.
    Quick,
    Checklist,
    Visualization,
    Reflection,
    /// Celebration shown after a completion that lands on a milestone.
    Milestone,
}

/// Choices collected during the onboarding prefix. The caller persists
/// them to configuration; the sequencer only collects and hands them back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingPreferences {
    pub name: Option<String>,
    pub preferred_mode: PreferredMode,
}

/// Cyclic state machine ordering the steps of one sitting.
pub struct RoutineSequencer<'a> {
    guard: CompletionGuard<'a>,
    telemetry: &'a dyn Telemetry,
    user_id: String,
    today: DayKey,
    step: RoutineStep,
    draft: MorningDraft,
    outcome: Option<MorningOutcome>,
}

impl<'a> RoutineSequencer<'a> {
    pub fn new(db: &'a Database, user_id: &str, today: DayKey, onboarded: bool) -> Self {
        Self::with_telemetry(db, user_id, today, onboarded, &NoopTelemetry)
    }

    pub fn with_telemetry(
        db: &'a Database,
        user_id: &str,
        today: DayKey,
        onboarded: bool,
        telemetry: &'a dyn Telemetry,
    ) -> Self {
        let step = if onboarded {
            RoutineStep::Welcome
        } else {
            RoutineStep::Onboarding
        };
        telemetry.emit(&Event::SessionStarted {
            user_id: user_id.to_string(),
            date: today,
            at: Utc::now(),
        });
        Self {
            guard: CompletionGuard::with_telemetry(db, telemetry),
            telemetry,
            user_id: user_id.to_string(),
            today,
            step,
            draft: MorningDraft::default(),
            outcome: None,
        }
    }

    pub fn step(&self) -> RoutineStep {
        self.step
    }

    /// Stats as of the last submission this session, if any.
    pub fn last_outcome(&self) -> Option<&MorningOutcome> {
        self.outcome.as_ref()
    }

    fn transition(&mut self, to: RoutineStep) {
        let from = self.step;
        self.step = to;
        self.telemetry.emit(&Event::StepAdvanced {
            from,
            to,
            at: Utc::now(),
        });
    }

    /// Leave onboarding, handing the collected preferences back for the
    /// caller to persist. Ignored outside the onboarding step.
    pub fn complete_onboarding(
        &mut self,
        prefs: OnboardingPreferences,
    ) -> Option<OnboardingPreferences> {
        if self.step != RoutineStep::Onboarding {
            return None;
        }
        self.transition(RoutineStep::Welcome);
        Some(prefs)
    }

    /// Start the full guided sequence.
    pub fn begin_full(&mut self) -> RoutineStep {
        if self.step == RoutineStep::Welcome {
            self.transition(RoutineStep::Breathe);
        }
        self.step
    }

    /// Start the shortened sitting.
    pub fn begin_quick(&mut self) -> RoutineStep {
        if self.step == RoutineStep::Welcome {
            self.transition(RoutineStep::Quick);
        }
        self.step
    }

    /// Finish (or skip) the breathing cycles.
    pub fn complete_breathe(&mut self) -> RoutineStep {
        if self.step == RoutineStep::Breathe {
            self.transition(RoutineStep::Checklist);
        }
        self.step
    }

    /// Record the planning answers and move on to visualization.
    pub fn complete_checklist(&mut self, draft: MorningDraft) -> RoutineStep {
        if self.step == RoutineStep::Checklist {
            self.draft = draft;
            self.transition(RoutineStep::Visualization);
        }
        self.step
    }

    pub fn complete_visualization(&mut self) -> RoutineStep {
        if self.step == RoutineStep::Visualization {
            self.draft.visualization_completed = true;
            self.transition(RoutineStep::Reflection);
        }
        self.step
    }

    /// Finish the sitting from the reflection step.
    ///
    /// Stores the reflection, then submits the accumulated morning entry.
    /// Both submissions tolerate `AlreadyCompletedToday`; storage failures
    /// propagate without advancing.
    pub fn complete_reflection(&mut self, reflection: &ReflectionDraft) -> Result<RoutineStep> {
        if self.step != RoutineStep::Reflection {
            return Ok(self.step);
        }
        match self.guard.record_reflection(&self.user_id, self.today, reflection) {
            Ok(_) => {}
            Err(CoreError::AlreadyCompletedToday { .. }) => {
                log::debug!("reflection for {} already recorded", self.today);
            }
            Err(e) => return Err(e),
        }
        let draft = std::mem::take(&mut self.draft);
        self.finish_day(&draft)
    }

    /// Finish the shortened sitting.
    pub fn complete_quick(&mut self, draft: &MorningDraft) -> Result<RoutineStep> {
        if self.step != RoutineStep::Quick {
            return Ok(self.step);
        }
        self.finish_day(draft)
    }

    /// Leave the celebration and return to the welcome step.
    pub fn acknowledge_milestone(&mut self) -> RoutineStep {
        if self.step == RoutineStep::Milestone {
            self.transition(RoutineStep::Welcome);
        }
        self.step
    }

    fn finish_day(&mut self, draft: &MorningDraft) -> Result<RoutineStep> {
        let milestone = match self.guard.complete_morning(&self.user_id, self.today, draft) {
            Ok(outcome) => {
                let milestone = outcome.milestone;
                self.outcome = Some(outcome);
                milestone
            }
            Err(CoreError::AlreadyCompletedToday { .. }) => {
                // Informational: the day already counted, no second
                // celebration for a repeat pass.
                log::debug!("morning for {} already completed", self.today);
                false
            }
            Err(e) => return Err(e),
        };
        if milestone {
            self.transition(RoutineStep::Milestone);
        } else {
            self.transition(RoutineStep::Welcome);
        }
        Ok(self.step)
    }
}
