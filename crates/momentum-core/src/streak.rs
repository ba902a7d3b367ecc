//! Pure streak arithmetic.
//!
//! Operates on whole calendar days only. Given the stored aggregate and the
//! day being completed, [`advance`] produces the patch to persist:
//!
//! - First completion ever starts the streak at 1
//! - A completion exactly one day after the last continues the streak
//! - Any larger gap resets the streak to 1 (the completed day still counts)
//! - Lifetime completions always grow by exactly 1
//!
//! Callers reach this only through the completion guard, which has already
//! rejected same-day duplicates.

use crate::day::DayKey;
use crate::storage::{StatsPatch, StatsSnapshot};

/// Streak lengths that trigger a milestone celebration.
///
/// Every full week, plus the habit-formation markers at 21 and 50 days.
pub fn is_milestone(streak: u32) -> bool {
    streak > 0 && (streak % 7 == 0 || streak == 21 || streak == 50)
}

/// How a completion related to the chain it extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First completion ever.
    Started,
    /// Exactly one day after the last completion.
    Continued,
    /// A gap of more than one day was bridged; the streak restarts at 1.
    Reset,
    /// Same-day replay or clock skew; nothing counted.
    Unchanged,
}

/// Compute the stats patch for completing `today`.
///
/// Pure: reads the aggregate, never writes. A `days_since` of zero or less
/// (same-day replay, clock skew) yields an empty patch and `Unchanged`.
pub fn advance(stats: &StatsSnapshot, today: DayKey) -> (StatsPatch, StreakChange) {
    let (streak, change) = match stats.last_completion_date {
        None => (1, StreakChange::Started),
        Some(last) => match today.days_since(last) {
            1 => (stats.current_streak + 1, StreakChange::Continued),
            d if d > 1 => (1, StreakChange::Reset),
            _ => {
                return (StatsPatch::default(), StreakChange::Unchanged);
            }
        },
    };
    let patch = StatsPatch {
        current_streak: Some(streak),
        total_completions: Some(stats.total_completions + 1),
        last_completion_date: Some(Some(today)),
        last_recovery_date: None,
    };
    (patch, change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    fn stats(streak: u32, total: u64, last: Option<&str>) -> StatsSnapshot {
        StatsSnapshot {
            user_id: "u1".into(),
            current_streak: streak,
            total_completions: total,
            last_completion_date: last.map(|s| day(s)),
            last_recovery_date: None,
        }
    }

    #[test]
    fn first_completion_starts_at_one() {
        let (patch, change) = advance(&stats(0, 0, None), day("2024-03-01"));
        assert_eq!(patch.current_streak, Some(1));
        assert_eq!(patch.total_completions, Some(1));
        assert_eq!(patch.last_completion_date, Some(Some(day("2024-03-01"))));
        assert_eq!(change, StreakChange::Started);
    }

    #[test]
    fn consecutive_day_continues() {
        let (patch, change) = advance(&stats(1, 1, Some("2024-03-01")), day("2024-03-02"));
        assert_eq!(patch.current_streak, Some(2));
        assert_eq!(patch.total_completions, Some(2));
        assert_eq!(change, StreakChange::Continued);
    }

    #[test]
    fn gap_resets_to_one_but_counts_the_day() {
        let (patch, change) = advance(&stats(2, 2, Some("2024-03-02")), day("2024-03-04"));
        assert_eq!(patch.current_streak, Some(1));
        assert_eq!(patch.total_completions, Some(3));
        assert_eq!(patch.last_completion_date, Some(Some(day("2024-03-04"))));
        assert_eq!(change, StreakChange::Reset);
    }

    #[test]
    fn continuation_across_month_boundary() {
        let (patch, _) = advance(&stats(5, 10, Some("2024-02-29")), day("2024-03-01"));
        assert_eq!(patch.current_streak, Some(6));
    }

    #[test]
    fn same_day_is_a_no_op() {
        let (patch, change) = advance(&stats(3, 3, Some("2024-03-01")), day("2024-03-01"));
        assert_eq!(patch.current_streak, None);
        assert_eq!(patch.total_completions, None);
        assert_eq!(patch.last_completion_date, None);
        assert_eq!(change, StreakChange::Unchanged);
    }

    #[test]
    fn milestone_days() {
        assert!(!is_milestone(0));
        assert!(!is_milestone(1));
        assert!(!is_milestone(6));
        assert!(is_milestone(7));
        assert!(is_milestone(14));
        assert!(is_milestone(21));
        assert!(!is_milestone(22));
        assert!(is_milestone(50));
        assert!(!is_milestone(51));
        assert!(is_milestone(70));
    }

    proptest! {
        /// Completing a later day always grows lifetime completions by
        /// exactly one and lands the streak at either old+1 or 1.
        #[test]
        fn later_day_always_counts(streak in 0u32..10_000, total in 0u64..100_000, gap in 1i64..3650) {
            let last = day("2020-01-01");
            let today = DayKey::new(last.date() + chrono::Days::new(gap as u64));
            let s = StatsSnapshot {
                user_id: "u1".into(),
                current_streak: streak,
                total_completions: total,
                last_completion_date: Some(last),
                last_recovery_date: None,
            };
            let (patch, change) = advance(&s, today);
            prop_assert_eq!(patch.total_completions, Some(total + 1));
            let new_streak = patch.current_streak.unwrap();
            if gap == 1 {
                prop_assert_eq!(new_streak, streak + 1);
                prop_assert_eq!(change, StreakChange::Continued);
            } else {
                prop_assert_eq!(new_streak, 1);
                prop_assert_eq!(change, StreakChange::Reset);
            }
            prop_assert_eq!(patch.last_completion_date, Some(Some(today)));
        }
    }
}
