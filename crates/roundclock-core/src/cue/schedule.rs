//! Which cue plays when.
//!
//! Every phase pips on its own last three seconds, including the second it
//! is entered on when it is that short. Entering WORK plays the
//! go tone, entering a REST that actually lasts plays the rest tone, and
//! FINISHED plays the fanfare.

use super::tone::Cue;
use crate::timer::{Phase, PhaseChange, TickOutcome};

/// Countdown pips start at this many seconds remaining.
pub const COUNTDOWN_FROM: u32 = 3;

pub fn countdown_cue(phase: Phase, remaining_seconds: u32) -> Option<Cue> {
    (phase.is_active() && (1..=COUNTDOWN_FROM).contains(&remaining_seconds)).then_some(Cue::Countdown)
}

pub fn transition_cue(change: &PhaseChange) -> Option<Cue> {
    match (change.from, change.to) {
        (_, Phase::Finished) => Some(Cue::Finish),
        (Phase::Prep | Phase::Rest, Phase::Work) => Some(Cue::Go),
        (Phase::Work, Phase::Rest) if change.remaining_seconds > 0 => Some(Cue::RestStart),
        _ => None,
    }
}

/// Cues caused by one processed tick, in playback order.
pub fn cues_for_tick(phase: Phase, outcome: &TickOutcome) -> Vec<Cue> {
    match outcome {
        TickOutcome::Counted { remaining_seconds } => {
            countdown_cue(phase, *remaining_seconds).into_iter().collect()
        }
        TickOutcome::Advanced(changes) => {
            let mut cues: Vec<Cue> = changes.iter().filter_map(transition_cue).collect();
            if let Some(last) = changes.last() {
                cues.extend(countdown_cue(last.to, last.remaining_seconds));
            }
            cues
        }
    }
}
