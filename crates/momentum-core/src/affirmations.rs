//! Daily affirmation shown on the welcome step.
//!
//! Selection is deterministic per calendar day, so every session on the
//! same day sees the same line.

use chrono::Datelike;

use crate::day::DayKey;

pub const AFFIRMATIONS: [&str; 12] = [
    "I am greater than my environment, body, and time. I choose to be the creator of my life.",
    "Every morning brings new potential, and I embrace it with confidence.",
    "I am capable of creating positive change in my life and the lives of others.",
    "Today I choose to focus on what I can control and let go of what I cannot.",
    "I am building the life I want, one intentional decision at a time.",
    "My thoughts create my reality, and I choose thoughts that empower me.",
    "I trust in my ability to navigate challenges with grace and wisdom.",
    "Each breath I take fills me with energy and clarity for the day ahead.",
    "I am worthy of all the good things that come into my life.",
    "I choose to see opportunities where others see obstacles.",
    "My actions today align with my highest values and aspirations.",
    "I am becoming the person I've always been meant to be.",
];

/// The affirmation for a given day.
pub fn daily(day: DayKey) -> &'static str {
    let index = day.date().num_days_from_ce().rem_euclid(AFFIRMATIONS.len() as i32);
    AFFIRMATIONS[index as usize]
}
