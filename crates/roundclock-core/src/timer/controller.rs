//! Session controller.
//!
//! Owns the live [`SessionState`] and is the only thing that mutates it.
//! Clock ticks go through the pure phase machine; the controller applies the
//! result, fires cues and notifies subscribers.
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = SessionController::new(CueEngine::silent());
//! controller.configure(SessionConfig::new(30, 15, 3))?;
//! controller.start()?;
//! // In a loop, at least once per second:
//! for event in controller.pump()? { /* ... */ }
//! ```

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use super::clock::{MonotonicClock, PhaseClock, SystemClock};
use super::machine::{self, TickOutcome};
use super::session::{Phase, SessionConfig, SessionState};
use crate::cue::{countdown_cue, cues_for_tick, CueEngine};
use crate::error::{Result, TransitionError};
use crate::events::Event;

pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&SessionState)>;

pub struct SessionController<C = SystemClock> {
    config: SessionConfig,
    state: SessionState,
    /// Length of the current phase, for progress display.
    phase_total_seconds: u32,
    clock: PhaseClock<C>,
    cues: CueEngine,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl SessionController<SystemClock> {
    pub fn new(cues: CueEngine) -> Self {
        Self::with_clock(SystemClock::new(), cues)
    }
}

impl<C: MonotonicClock> SessionController<C> {
    pub fn with_clock(clock: C, mut cues: CueEngine) -> Self {
        let config = SessionConfig::default();
        cues.set_sound_enabled(config.sound_enabled);
        Self {
            state: SessionState::idle(&config),
            config,
            phase_total_seconds: 0,
            clock: PhaseClock::new(clock),
            cues,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Configuration the next (or current) session runs with.
    pub fn pending_config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cues(&self) -> &CueEngine {
        &self.cues
    }

    pub fn until_next_tick(&self) -> Option<Duration> {
        self.clock.until_next_tick()
    }

    pub fn progress_pct(&self) -> f64 {
        machine::progress_pct(&self.config, &self.state)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.state.phase,
            current_round: self.state.current_round,
            total_rounds: self.state.total_rounds,
            remaining_seconds: self.state.remaining_seconds,
            phase_total_seconds: self.phase_total_seconds,
            running: self.state.running,
            sound_enabled: self.config.sound_enabled,
            session_progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Register a state observer. Called once per processed tick and once
    /// per successful control call.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&SessionState) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration. Only legal between sessions.
    ///
    /// # Errors
    ///
    /// `TransitionError::AlreadyRunning` during a session,
    /// `ConfigError::InvalidValue` for an unusable configuration.
    pub fn configure(&mut self, config: SessionConfig) -> Result<Event> {
        self.ensure_between_sessions()?;
        config.validate()?;
        self.config = config;
        self.cues.set_sound_enabled(config.sound_enabled);
        self.state = SessionState::idle(&config);
        self.phase_total_seconds = 0;
        self.notify();
        Ok(Event::SessionConfigured {
            config,
            at: Utc::now(),
        })
    }

    /// Begin a fresh session at PREP. Must be called from a user action:
    /// this is where the audio output gets unlocked.
    ///
    /// # Errors
    ///
    /// `TransitionError::AlreadyRunning` during a session,
    /// `ConfigError::InvalidValue` for an unusable configuration.
    pub fn start(&mut self) -> Result<Event> {
        self.ensure_between_sessions()?;
        self.config.validate()?;

        self.cues.unlock();

        let mut state = SessionState::idle(&self.config);
        let lead_in = machine::begin(&self.config);
        machine::apply(&mut state, &lead_in);
        state.running = true;
        self.state = state;
        self.phase_total_seconds = lead_in.next_remaining;

        self.clock.reset();
        self.clock.start();

        info!(
            work = self.config.work_seconds,
            rest = self.config.rest_seconds,
            rounds = self.config.total_rounds,
            "session started"
        );

        if let Some(cue) = countdown_cue(self.state.phase, self.state.remaining_seconds) {
            self.cues.play(cue);
        }
        self.notify();

        Ok(Event::SessionStarted {
            work_seconds: self.config.work_seconds,
            rest_seconds: self.config.rest_seconds,
            total_rounds: self.config.total_rounds,
            total_seconds: machine::total_seconds(&self.config),
            at: Utc::now(),
        })
    }

    /// Freeze the countdown and suspend the audio output. A second pause is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// `TransitionError::NotActive` while IDLE or FINISHED.
    pub fn pause(&mut self) -> Result<Event> {
        self.ensure_in_session()?;
        if self.state.running {
            self.clock.stop();
            self.cues.suspend();
            self.state.running = false;
            debug!(phase = %self.state.phase, remaining = self.state.remaining_seconds, "paused");
            self.notify();
        }
        Ok(Event::SessionPaused {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Continue from the remaining time at pause. A second resume leaves the
    /// countdown alone. Like `start()`, this is a user action, so the audio
    /// output is unlocked again.
    ///
    /// # Errors
    ///
    /// `TransitionError::NotActive` while IDLE or FINISHED.
    pub fn resume(&mut self) -> Result<Event> {
        self.ensure_in_session()?;
        self.cues.unlock();
        if !self.state.running {
            self.clock.start();
            self.state.running = true;
            debug!(phase = %self.state.phase, remaining = self.state.remaining_seconds, "resumed");
            self.notify();
        }
        Ok(Event::SessionResumed {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Abandon the session from any phase and release the audio output.
    pub fn reset(&mut self) -> Event {
        self.clock.reset();
        self.cues.cancel();
        self.cues.release();
        if self.state.phase != Phase::Idle {
            info!(phase = %self.state.phase, "session reset");
        }
        self.state = SessionState::idle(&self.config);
        self.phase_total_seconds = 0;
        self.notify();
        Event::SessionReset { at: Utc::now() }
    }

    /// Flip sound on/off. Allowed at any time; vibration is unaffected.
    pub fn toggle_sound(&mut self) -> Event {
        self.config.sound_enabled = !self.config.sound_enabled;
        self.cues.set_sound_enabled(self.config.sound_enabled);
        self.notify();
        Event::SoundToggled {
            enabled: self.config.sound_enabled,
            at: Utc::now(),
        }
    }

    /// Process every second elapsed since the last pump, one tick at a time.
    ///
    /// Call at least once per second while running; after a long stall the
    /// missed ticks are replayed in order, transitions included.
    ///
    /// # Errors
    ///
    /// Only on an internal inconsistency between state and configuration.
    pub fn pump(&mut self) -> Result<Vec<Event>> {
        let due = self.clock.poll();
        if due > 1 {
            debug!(due, "catching up missed ticks");
        }
        let mut events = Vec::new();
        for _ in 0..due {
            if !self.state.running {
                break;
            }
            self.process_tick(&mut events)?;
        }
        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn process_tick(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let phase = self.state.phase;
        let outcome = machine::tick(&mut self.state, &self.config)?;

        for cue in cues_for_tick(phase, &outcome) {
            self.cues.play(cue);
        }

        if let TickOutcome::Advanced(changes) = outcome {
            let now = Utc::now();
            for change in changes {
                debug!(from = %change.from, to = %change.to, round = change.round, "phase change");
                events.push(Event::PhaseChanged {
                    from: change.from,
                    to: change.to,
                    round: change.round,
                    remaining_seconds: change.remaining_seconds,
                    at: now,
                });
                self.phase_total_seconds = change.remaining_seconds;
                if change.to == Phase::Finished {
                    self.clock.reset();
                    info!(rounds = self.config.total_rounds, "session finished");
                    events.push(Event::SessionFinished {
                        total_rounds: self.config.total_rounds,
                        at: now,
                    });
                }
            }
        }

        self.notify();
        Ok(())
    }

    fn ensure_between_sessions(&self) -> Result<(), TransitionError> {
        if self.state.phase.is_active() {
            return Err(TransitionError::AlreadyRunning {
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn ensure_in_session(&self) -> Result<(), TransitionError> {
        if !self.state.phase.is_active() {
            return Err(TransitionError::NotActive {
                phase: self.state.phase,
            });
        }
        Ok(())
    }

    fn notify(&mut self) {
        let state = self.state;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&state);
        }
    }
}

impl<C> std::fmt::Debug for SessionController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cues", &self.cues)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
