//! Phase transition logic.
//!
//! Everything here is pure: given a phase, a round counter and a
//! configuration it decides what comes next. No clocks, no audio.
//!
//! ```text
//! IDLE -> PREP -> WORK -> REST -> WORK -> ... -> WORK -> FINISHED
//! ```
//!
//! The final WORK goes straight to FINISHED. A zero-second REST is still
//! entered and left, inside a single tick, so the round counter moves the
//! same way whether or not rest is configured.

use serde::{Deserialize, Serialize};

use super::session::{Phase, SessionConfig, SessionState};
use crate::error::TransitionError;

/// Lead-in before the first work interval.
pub const PREP_SECONDS: u32 = 3;

/// Result of leaving a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub next_phase: Phase,
    pub next_round: u32,
    pub next_remaining: u32,
    /// True when `next_phase` is FINISHED.
    pub terminal: bool,
}

/// One applied transition, as reported by [`tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    pub round: u32,
    pub remaining_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down inside the same phase.
    Counted { remaining_seconds: u32 },
    /// The phase ran out. Changes are listed in the order they were applied.
    Advanced(Vec<PhaseChange>),
}

/// One contiguous stretch of a planned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub phase: Phase,
    pub round: u32,
    pub seconds: u32,
}

/// IDLE -> PREP.
pub fn begin(_config: &SessionConfig) -> Transition {
    Transition {
        next_phase: Phase::Prep,
        next_round: 1,
        next_remaining: PREP_SECONDS,
        terminal: false,
    }
}

/// Decide the phase that follows `phase` once its countdown is exhausted.
///
/// # Errors
///
/// `SessionFinished` when called on FINISHED, `InvalidRound` when `round`
/// is outside `1..=total_rounds` or a REST is requested after the last round.
pub fn advance(
    phase: Phase,
    round: u32,
    config: &SessionConfig,
) -> Result<Transition, TransitionError> {
    let total = config.total_rounds;
    let invalid = || TransitionError::InvalidRound {
        phase,
        round,
        total_rounds: total,
    };

    match phase {
        Phase::Idle => Ok(begin(config)),
        Phase::Finished => Err(TransitionError::SessionFinished),
        _ if round == 0 || round > total => Err(invalid()),
        Phase::Prep => Ok(Transition {
            next_phase: Phase::Work,
            next_round: round,
            next_remaining: config.work_seconds,
            terminal: false,
        }),
        Phase::Work if round < total => Ok(Transition {
            next_phase: Phase::Rest,
            next_round: round,
            next_remaining: config.rest_seconds,
            terminal: false,
        }),
        Phase::Work => Ok(Transition {
            next_phase: Phase::Finished,
            next_round: round,
            next_remaining: 0,
            terminal: true,
        }),
        Phase::Rest if round < total => Ok(Transition {
            next_phase: Phase::Work,
            next_round: round + 1,
            next_remaining: config.work_seconds,
            terminal: false,
        }),
        Phase::Rest => Err(invalid()),
    }
}

/// Consume one elapsed second.
///
/// Decrements `remaining_seconds` by exactly one. When the phase is
/// exhausted the following transitions are applied to `state`, continuing
/// through any zero-length phase so the returned state always has time left
/// on it (or is FINISHED).
///
/// # Errors
///
/// `NotActive` while IDLE, `SessionFinished` once FINISHED.
pub fn tick(state: &mut SessionState, config: &SessionConfig) -> Result<TickOutcome, TransitionError> {
    match state.phase {
        Phase::Idle => return Err(TransitionError::NotActive { phase: Phase::Idle }),
        Phase::Finished => return Err(TransitionError::SessionFinished),
        _ => {}
    }

    state.remaining_seconds = state.remaining_seconds.saturating_sub(1);
    if state.remaining_seconds > 0 {
        return Ok(TickOutcome::Counted {
            remaining_seconds: state.remaining_seconds,
        });
    }

    let mut changes = Vec::new();
    loop {
        let from = state.phase;
        let next = advance(from, state.current_round, config)?;
        apply(state, &next);
        changes.push(PhaseChange {
            from,
            to: next.next_phase,
            round: next.next_round,
            remaining_seconds: next.next_remaining,
        });
        if next.terminal || next.next_remaining > 0 {
            break;
        }
    }
    Ok(TickOutcome::Advanced(changes))
}

/// Write a transition into the live state.
pub fn apply(state: &mut SessionState, transition: &Transition) {
    state.phase = transition.next_phase;
    state.current_round = transition.next_round;
    state.remaining_seconds = transition.next_remaining;
    if transition.terminal {
        state.running = false;
    }
}

/// Every segment a full run of `config` visits, zero-length rests included.
pub fn plan(config: &SessionConfig) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut step = begin(config);
    while !step.terminal {
        segments.push(Segment {
            phase: step.next_phase,
            round: step.next_round,
            seconds: step.next_remaining,
        });
        step = match advance(step.next_phase, step.next_round, config) {
            Ok(next) => next,
            Err(_) => break,
        };
    }
    segments
}

pub fn total_seconds(config: &SessionConfig) -> u64 {
    plan(config).iter().map(|s| u64::from(s.seconds)).sum()
}

/// 0.0 .. 100.0 progress across the whole session.
pub fn progress_pct(config: &SessionConfig, state: &SessionState) -> f64 {
    match state.phase {
        Phase::Idle => return 0.0,
        Phase::Finished => return 100.0,
        _ => {}
    }
    let segments = plan(config);
    let total: u64 = segments.iter().map(|s| u64::from(s.seconds)).sum();
    if total == 0 {
        return 0.0;
    }
    let mut elapsed = 0u64;
    for segment in &segments {
        if segment.phase == state.phase && segment.round == state.current_round {
            elapsed += u64::from(segment.seconds.saturating_sub(state.remaining_seconds));
            break;
        }
        elapsed += u64::from(segment.seconds);
    }
    (elapsed as f64 / total as f64 * 100.0).min(100.0)
}
