pub mod config;
pub mod cue;
pub mod plan;
pub mod run;

use std::io::Write;

use clap::Args;
use roundclock_core::cue::Haptics;
use roundclock_core::{Config, CueEngine, SessionConfig};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Session shape overrides; anything left out comes from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Work interval in seconds
    #[arg(long)]
    pub work: Option<u32>,
    /// Rest interval in seconds (0 skips rest)
    #[arg(long)]
    pub rest: Option<u32>,
    /// Number of work intervals
    #[arg(long)]
    pub rounds: Option<u32>,
}

impl SessionArgs {
    pub fn resolve(&self, config: &Config) -> SessionConfig {
        let base = config.session_config();
        SessionConfig {
            work_seconds: self.work.unwrap_or(base.work_seconds),
            rest_seconds: self.rest.unwrap_or(base.rest_seconds),
            total_rounds: self.rounds.unwrap_or(base.total_rounds),
            sound_enabled: base.sound_enabled,
        }
    }
}

/// Terminal stand-in for a vibration motor: rings the bell once per pattern.
struct TerminalBell;

impl Haptics for TerminalBell {
    fn vibrate(&mut self, _pattern: &[u32]) -> bool {
        let mut err = std::io::stderr();
        err.write_all(b"\x07").and_then(|_| err.flush()).is_ok()
    }
}

/// Cue engine wired to the default output device when built with `audio`.
pub fn cue_engine(config: &Config) -> CueEngine {
    #[cfg(feature = "audio")]
    let engine = CueEngine::new(roundclock_core::cue::DeviceOutput::factory(config.cues.sample_rate));
    #[cfg(not(feature = "audio"))]
    let engine = CueEngine::silent();

    let engine = engine.with_volume(config.gain());
    if config.cues.vibration {
        engine.with_haptics(TerminalBell)
    } else {
        engine
    }
}
