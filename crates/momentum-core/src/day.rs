//! Calendar-day identifiers.
//!
//! All day-uniqueness and streak arithmetic operates on whole calendar days,
//! never on wall-clock timestamps. A [`DayKey`] is computed once per session
//! (from the caller's local clock) and passed explicitly to every operation,
//! so a session that straddles midnight stays on one consistent day.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar day with no time-of-day component.
///
/// Renders as `YYYY-MM-DD`; this string form is the uniqueness key for
/// daily records in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The current calendar day in the caller's local reference frame.
    ///
    /// Call this once per session and thread the value through; do not
    /// re-derive it at each call site.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// The calendar day immediately before this one.
    pub fn yesterday(&self) -> Self {
        Self(self.0 - Days::new(1))
    }

    /// Signed number of whole calendar days from `earlier` to `self`.
    ///
    /// Midnight-to-midnight difference: consecutive days always yield 1,
    /// regardless of time-of-day variance in the underlying events.
    pub fn days_since(&self, earlier: DayKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}
