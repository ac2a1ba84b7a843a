//! # roundclock Core Library
//!
//! This library provides the core logic for the roundclock interval timer:
//! prepare, work, rest, repeated for N rounds, with synthesized audio cues.
//! The CLI is a thin front end over the same library; any other front end
//! subscribes to the same controller.
//!
//! ## Architecture
//!
//! - **PhaseClock**: one tick per elapsed second, anchored to the session
//!   start so late callbacks never accumulate drift
//! - **Phase machine**: pure transition logic (`advance`, `tick`, `plan`)
//! - **Cue engine**: procedural tones and vibration, lazily unlocked audio
//!   output, failures logged and swallowed
//! - **SessionController**: owns the live state and wires the three together
//! - **Driver**: tokio loop feeding clock ticks and user commands to the
//!   controller
//!
//! ## Key Components
//!
//! - [`SessionController`]: the control surface (start/pause/resume/reset)
//! - [`CueEngine`]: audio/haptic cue playback
//! - [`Config`]: application configuration management

pub mod cue;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use cue::{Cue, CueEngine, CueEvent, Waveform};
pub use error::{ConfigError, CoreError, CueError, TransitionError};
pub use events::Event;
pub use storage::Config;
pub use timer::{Phase, SessionConfig, SessionController, SessionState};
