//! End-to-end tests for grace-period streak recovery.

use momentum_core::recovery::{RECOVERY_EMBODIED_TEXT, RECOVERY_GRATEFUL_TEXT};
use momentum_core::storage::database::Database;
use momentum_core::{CompletionGuard, CoreError, DayKey, MorningDraft, RecoveryPolicy};

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

fn build_streak(db: &Database, user: &str, days: &[&str]) {
    let guard = CompletionGuard::new(db);
    for d in days {
        guard
            .complete_morning(user, day(d), &MorningDraft::default())
            .unwrap();
    }
}

#[test]
fn recovery_repairs_a_single_missed_day() {
    let db = Database::open_memory().unwrap();
    build_streak(&db, "u1", &["2024-03-01", "2024-03-02", "2024-03-03"]);

    // March 4th missed; user recovers on the 5th.
    let policy = RecoveryPolicy::new(&db);
    let out = policy
        .recover_streak("u1", day("2024-03-05"), "still thought about the routine")
        .unwrap();

    // The reflection lands on the missed day with the standard
    // companion texts beside the user's own answer.
    assert_eq!(out.reflection.date, day("2024-03-04"));
    assert_eq!(
        out.reflection.well_done.as_deref(),
        Some("still thought about the routine")
    );
    assert_eq!(out.reflection.embodied.as_deref(), Some(RECOVERY_EMBODIED_TEXT));
    assert_eq!(out.reflection.grateful.as_deref(), Some(RECOVERY_GRATEFUL_TEXT));

    // The aggregate is anchored to the missed day, not the execution day.
    assert_eq!(out.stats.current_streak, 4);
    assert_eq!(out.stats.last_completion_date, Some(day("2024-03-04")));
    assert_eq!(out.stats.last_recovery_date, Some(day("2024-03-05")));

    // Today's own completion then extends the repaired chain.
    let guard = CompletionGuard::new(&db);
    let after = guard
        .complete_morning("u1", day("2024-03-05"), &MorningDraft::default())
        .unwrap();
    assert_eq!(after.stats.current_streak, 5);
}

#[test]
fn recovery_is_limited_to_once_per_rolling_week() {
    let db = Database::open_memory().unwrap();
    let policy = RecoveryPolicy::new(&db);
    policy.recover_streak("u1", day("2024-03-05"), "first").unwrap();

    for attempt in ["2024-03-06", "2024-03-09", "2024-03-11"] {
        let err = policy.recover_streak("u1", day(attempt), "again").unwrap_err();
        assert!(matches!(
            err,
            CoreError::RecoveryAlreadyUsedThisWeek { last_used } if last_used == day("2024-03-05")
        ));
    }

    // Exactly seven days later it is allowed again.
    let out = policy.recover_streak("u1", day("2024-03-12"), "a week on").unwrap();
    assert_eq!(out.stats.last_recovery_date, Some(day("2024-03-12")));
}

#[test]
fn recovery_requires_a_non_empty_reflection() {
    let db = Database::open_memory().unwrap();
    let policy = RecoveryPolicy::new(&db);
    for text in ["", "   ", "\n\t"] {
        let err = policy.recover_streak("u1", day("2024-03-05"), text).unwrap_err();
        assert!(matches!(err, CoreError::RecoveryRequiresReflection));
    }
    // Nothing was persisted by the rejected attempts.
    assert!(db.reflection_by_date("u1", day("2024-03-04")).unwrap().is_none());
    assert_eq!(db.user_stats("u1").unwrap().last_recovery_date, None);
}

#[test]
fn recovery_with_no_missed_day_keeps_the_allowance() {
    let db = Database::open_memory().unwrap();
    build_streak(&db, "u1", &["2024-03-01", "2024-03-02"]);

    // The chain is intact; recovering on the 3rd has nothing to repair.
    let policy = RecoveryPolicy::new(&db);
    let err = policy
        .recover_streak("u1", day("2024-03-03"), "all good actually")
        .unwrap_err();
    assert!(matches!(err, CoreError::NothingToRecover));

    // No backdated reflection, no spent allowance, streak untouched.
    assert!(db.reflection_by_date("u1", day("2024-03-02")).unwrap().is_none());
    let stats = db.user_stats("u1").unwrap();
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.last_recovery_date, None);
    assert!(policy.available("u1", day("2024-03-03")).unwrap());
}

#[test]
fn recovery_after_todays_completion_is_rejected() {
    let db = Database::open_memory().unwrap();
    // An old completion, then a gap, then today's completion first.
    build_streak(&db, "u1", &["2024-03-01", "2024-03-04"]);

    // The broken chain cannot be repaired retroactively once today has
    // been completed: the last completion is today, not a missed day.
    let policy = RecoveryPolicy::new(&db);
    let err = policy
        .recover_streak("u1", day("2024-03-04"), "late repair")
        .unwrap_err();
    assert!(matches!(err, CoreError::NothingToRecover));
    let stats = db.user_stats("u1").unwrap();
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.last_recovery_date, None);
    assert!(policy.available("u1", day("2024-03-04")).unwrap());
}

#[test]
fn recovery_does_not_double_count_a_day_that_has_a_reflection() {
    let db = Database::open_memory().unwrap();
    let guard = CompletionGuard::new(&db);
    guard
        .record_reflection(
            "u1",
            day("2024-03-04"),
            &momentum_core::ReflectionDraft {
                well_done: Some("already reflected".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let policy = RecoveryPolicy::new(&db);
    let err = policy.recover_streak("u1", day("2024-03-05"), "repair").unwrap_err();
    assert!(matches!(
        err,
        CoreError::AlreadyCompletedToday { date } if date == day("2024-03-04")
    ));
    // The weekly allowance survives the failed attempt.
    assert!(policy.available("u1", day("2024-03-05")).unwrap());
}
