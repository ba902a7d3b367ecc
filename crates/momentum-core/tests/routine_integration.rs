//! End-to-end tests for the streak engine.
//!
//! Drives multi-day sequences through the completion guard and sequencer
//! against an in-memory record store and checks the aggregate after every
//! step.

use momentum_core::storage::database::Database;
use momentum_core::{
    CompletionGuard, CoreError, DayKey, MorningDraft, ReflectionDraft, RoutineSequencer,
    RoutineStep, StatsPatch,
};

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

#[test]
fn multi_day_streak_lifecycle() {
    let db = Database::open_memory().unwrap();
    let guard = CompletionGuard::new(&db);

    // Fresh aggregate.
    let stats = db.user_stats("u1").unwrap();
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.total_completions, 0);
    assert_eq!(stats.last_completion_date, None);

    // First completion starts the streak.
    let out = guard
        .complete_morning("u1", day("2024-03-01"), &MorningDraft::default())
        .unwrap();
    assert_eq!(out.stats.current_streak, 1);
    assert_eq!(out.stats.total_completions, 1);
    assert_eq!(out.stats.last_completion_date, Some(day("2024-03-01")));

    // Same-day repeat is rejected and changes nothing.
    let err = guard
        .complete_morning("u1", day("2024-03-01"), &MorningDraft::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyCompletedToday { .. }));
    let stats = db.user_stats("u1").unwrap();
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.total_completions, 1);
    assert_eq!(db.list_morning_entries("u1").unwrap().len(), 1);

    // Next day continues.
    let out = guard
        .complete_morning("u1", day("2024-03-02"), &MorningDraft::default())
        .unwrap();
    assert_eq!(out.stats.current_streak, 2);
    assert_eq!(out.stats.total_completions, 2);

    // Skipping March 3rd resets the streak but still counts the day.
    let out = guard
        .complete_morning("u1", day("2024-03-04"), &MorningDraft::default())
        .unwrap();
    assert_eq!(out.stats.current_streak, 1);
    assert_eq!(out.stats.total_completions, 3);
    assert_eq!(out.stats.last_completion_date, Some(day("2024-03-04")));
}

#[test]
fn stats_are_scoped_per_user() {
    let db = Database::open_memory().unwrap();
    let guard = CompletionGuard::new(&db);
    guard
        .complete_morning("ada", day("2024-03-01"), &MorningDraft::default())
        .unwrap();
    guard
        .complete_morning("ada", day("2024-03-02"), &MorningDraft::default())
        .unwrap();
    guard
        .complete_morning("ben", day("2024-03-02"), &MorningDraft::default())
        .unwrap();

    assert_eq!(db.user_stats("ada").unwrap().current_streak, 2);
    assert_eq!(db.user_stats("ben").unwrap().current_streak, 1);
}

#[test]
fn sequencer_full_sitting_end_to_end() {
    let db = Database::open_memory().unwrap();
    let mut seq = RoutineSequencer::new(&db, "u1", day("2024-03-01"), true);
    seq.begin_full();
    seq.complete_breathe();
    seq.complete_checklist(MorningDraft {
        identity: Some("a person who shows up".into()),
        action: Some("write one page".into()),
        drank_water: true,
        exposed_to_light: true,
        moved_body: true,
        timer_completed: true,
        ..Default::default()
    });
    seq.complete_visualization();
    let step = seq
        .complete_reflection(&ReflectionDraft {
            well_done: Some("finished the whole sitting".into()),
            grateful: Some("quiet house".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(step, RoutineStep::Welcome);

    let entry = db
        .morning_entry_by_date("u1", day("2024-03-01"))
        .unwrap()
        .unwrap();
    assert!(entry.visualization_completed);
    assert!(entry.timer_completed);
    let reflection = db
        .reflection_by_date("u1", day("2024-03-01"))
        .unwrap()
        .unwrap();
    assert_eq!(reflection.grateful.as_deref(), Some("quiet house"));
    assert_eq!(db.user_stats("u1").unwrap().current_streak, 1);
}

#[test]
fn sequencer_celebrates_weekly_milestones_only_on_fresh_completion() {
    let db = Database::open_memory().unwrap();
    db.update_user_stats(
        "u1",
        &StatsPatch {
            current_streak: Some(13),
            total_completions: Some(40),
            last_completion_date: Some(Some(day("2024-03-13"))),
            ..Default::default()
        },
    )
    .unwrap();

    let mut seq = RoutineSequencer::new(&db, "u1", day("2024-03-14"), true);
    seq.begin_quick();
    assert_eq!(
        seq.complete_quick(&MorningDraft::default()).unwrap(),
        RoutineStep::Milestone
    );
    seq.acknowledge_milestone();

    // A second pass on the same milestone day does not celebrate again.
    let mut again = RoutineSequencer::new(&db, "u1", day("2024-03-14"), true);
    again.begin_quick();
    assert_eq!(
        again.complete_quick(&MorningDraft::default()).unwrap(),
        RoutineStep::Welcome
    );
    assert_eq!(db.user_stats("u1").unwrap().current_streak, 14);
}
