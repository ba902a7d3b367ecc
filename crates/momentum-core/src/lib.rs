//! # Momentum Core Library
//!
//! This library provides the core business logic for Momentum, a guided
//! morning-routine app with a daily completion streak. It implements a
//! CLI-first philosophy where all operations are available via a standalone
//! CLI binary, with any GUI being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Routine Sequencer**: A cyclic state machine that walks the user
//!   through one sitting of the routine (breathe, checklist, visualization,
//!   reflection) and decides whether to show a milestone celebration
//! - **Completion Guard**: Enforces at-most-one morning entry and one
//!   reflection per calendar day and is the only path that advances the streak
//! - **Streak Calculator**: Pure calendar-day streak arithmetic
//! - **Recovery Policy**: Once-a-week retroactive repair of a missed day
//!   via a backdated reflection
//! - **Storage**: SQLite-based record store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RoutineSequencer`]: Per-session routine state machine
//! - [`CompletionGuard`]: Day-uniqueness gate and streak trigger
//! - [`RecoveryPolicy`]: Grace-period streak restoration
//! - [`Database`]: Morning entries, reflections, and per-user stats
//! - [`Config`]: Application configuration management

pub mod affirmations;
pub mod day;
pub mod error;
pub mod events;
pub mod guard;
pub mod recovery;
pub mod routine;
pub mod storage;
pub mod streak;

pub use day::DayKey;
pub use error::{ConfigError, CoreError, Result, StorageError};
pub use events::{Event, LogTelemetry, NoopTelemetry, Telemetry};
pub use guard::{CompletionGuard, MorningOutcome};
pub use recovery::{RecoveryOutcome, RecoveryPolicy};
pub use routine::{OnboardingPreferences, RoutineSequencer, RoutineStep};
pub use storage::{
    Config, Database, MorningDraft, MorningEntry, PreferredMode, Reflection, ReflectionDraft,
    StatsPatch, StatsSnapshot,
};
pub use streak::{advance, is_milestone, StreakChange};
