use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::day::DayKey;
use crate::routine::RoutineStep;

/// Every meaningful state change in the engine produces an Event.
/// The CLI logs them; any GUI layer subscribes to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        user_id: String,
        date: DayKey,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from: RoutineStep,
        to: RoutineStep,
        at: DateTime<Utc>,
    },
    MorningCompleted {
        user_id: String,
        date: DayKey,
        current_streak: u32,
        total_completions: u64,
        milestone: bool,
        at: DateTime<Utc>,
    },
    ReflectionRecorded {
        user_id: String,
        date: DayKey,
        at: DateTime<Utc>,
    },
    /// A gap larger than one day was observed while advancing the streak.
    StreakReset {
        user_id: String,
        previous_streak: u32,
        at: DateTime<Utc>,
    },
    RecoveryApplied {
        user_id: String,
        recovered_date: DayKey,
        restored_streak: u32,
        at: DateTime<Utc>,
    },
}

/// Sink for engine events.
///
/// Implementations must be cheap and infallible; dropping events is
/// acceptable, blocking the engine is not.
pub trait Telemetry {
    fn emit(&self, event: &Event);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn emit(&self, _event: &Event) {}
}

/// Writes each event to the log at info level as one JSON line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn emit(&self, event: &Event) {
        match serde_json::to_string(event) {
            Ok(json) => log::info!("event {json}"),
            Err(e) => log::warn!("unserializable event: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::MorningCompleted {
            user_id: "u1".into(),
            date: "2024-03-01".parse().unwrap(),
            current_streak: 7,
            total_completions: 12,
            milestone: true,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MorningCompleted");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["milestone"], true);
    }

    #[test]
    fn round_trip() {
        let event = Event::StreakReset {
            user_id: "u1".into(),
            previous_streak: 4,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Event::StreakReset { previous_streak: 4, .. }));
    }
}
