//! Core error types for roundclock-core.
//!
//! Configuration and transition errors are surfaced to the caller. Cue errors
//! exist so audio backends can report failures, but the cue engine logs and
//! swallows them instead of letting them reach the session controller.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::Phase;

/// Core error type for roundclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A control call that is not legal in the current phase
    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration directory could not be determined or created
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Control calls rejected because of the session's current phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `configure()`/`start()` while a session is in progress
    #[error("session already running (phase: {phase})")]
    AlreadyRunning { phase: Phase },

    /// `pause()`/`resume()` with no session in progress
    #[error("no active session (phase: {phase})")]
    NotActive { phase: Phase },

    /// `advance()` from FINISHED
    #[error("session finished; reset before advancing")]
    SessionFinished,

    /// Round counter outside the configured range for the requested step
    #[error("round {round} is not valid for {phase} with {total_rounds} total rounds")]
    InvalidRound {
        phase: Phase,
        round: u32,
        total_rounds: u32,
    },
}

/// Audio-output and haptic errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    /// No output device could be acquired
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    /// The output exists but refused to resume/suspend
    #[error("audio device error: {0}")]
    Device(String),

    /// A tone could not be queued
    #[error("tone playback failed: {0}")]
    Playback(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{ManualClock, SessionConfig, SessionController};
    use crate::CueEngine;

    #[test]
    fn control_failures_keep_their_category() {
        let mut controller = SessionController::with_clock(ManualClock::new(), CueEngine::silent());

        let err = controller.pause().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::NotActive { phase: Phase::Idle })
        ));
        assert_eq!(err.to_string(), "Invalid transition: no active session (phase: idle)");

        let err = controller.configure(SessionConfig::new(30, 15, 0)).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }
}
