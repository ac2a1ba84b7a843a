use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, SessionConfig};

/// Every state change of a session produces an Event.
/// Control calls return the event they caused; clock pumping returns the
/// transitions it applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionConfigured {
        config: SessionConfig,
        at: DateTime<Utc>,
    },
    SessionStarted {
        work_seconds: u32,
        rest_seconds: u32,
        total_rounds: u32,
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: Phase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        phase: Phase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    SoundToggled {
        enabled: bool,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        round: u32,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    SessionFinished {
        total_rounds: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        current_round: u32,
        total_rounds: u32,
        remaining_seconds: u32,
        phase_total_seconds: u32,
        running: bool,
        sound_enabled: bool,
        session_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::PhaseChanged {
            from: Phase::Work,
            to: Phase::Rest,
            round: 1,
            remaining_seconds: 15,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PhaseChanged");
        assert_eq!(json["to"], "rest");
    }
}
