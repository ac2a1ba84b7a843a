use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Phase of an interval session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Prep,
    Work,
    Rest,
    Finished,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Prep => "prep",
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::Finished => "finished",
        }
    }

    /// PREP, WORK and REST count down; IDLE and FINISHED do not.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Prep | Phase::Work | Phase::Rest)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval session configuration.
///
/// All durations are whole seconds. `rest_seconds = 0` is legal: the round
/// boundary is still counted, the rest simply lasts zero ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_work_seconds")]
    pub work_seconds: u32,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
    #[serde(default = "default_total_rounds")]
    pub total_rounds: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_work_seconds() -> u32 {
    30
}
fn default_rest_seconds() -> u32 {
    15
}
fn default_total_rounds() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_seconds: default_work_seconds(),
            rest_seconds: default_rest_seconds(),
            total_rounds: default_total_rounds(),
            sound_enabled: true,
        }
    }
}

impl SessionConfig {
    pub fn new(work_seconds: u32, rest_seconds: u32, total_rounds: u32) -> Self {
        Self {
            work_seconds,
            rest_seconds,
            total_rounds,
            sound_enabled: true,
        }
    }

    pub fn with_sound(mut self, sound_enabled: bool) -> Self {
        self.sound_enabled = sound_enabled;
        self
    }

    /// Reject configurations that can never produce a session.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.work_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "work_seconds".into(),
                message: "work duration must be at least 1 second".into(),
            });
        }
        if self.total_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "total_rounds".into(),
                message: "a session needs at least 1 round".into(),
            });
        }
        Ok(())
    }
}

/// Live state of a session, owned by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    /// 1-based; 0 while idle.
    pub current_round: u32,
    pub total_rounds: u32,
    pub remaining_seconds: u32,
    /// True only while the clock is ticking.
    pub running: bool,
}

impl SessionState {
    pub fn idle(config: &SessionConfig) -> Self {
        Self {
            phase: Phase::Idle,
            current_round: 0,
            total_rounds: config.total_rounds,
            remaining_seconds: 0,
            running: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_rest_is_valid() {
        assert!(SessionConfig::new(20, 0, 2).validate().is_ok());
    }

    #[test]
    fn zero_work_is_rejected() {
        let err = SessionConfig::new(0, 10, 2).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "work_seconds"));
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let err = SessionConfig::new(10, 10, 0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "total_rounds"));
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Rest).unwrap(), "\"rest\"");
        assert_eq!(Phase::Finished.to_string(), "finished");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: SessionConfig = toml::from_str("work_seconds = 45").unwrap();
        assert_eq!(cfg.work_seconds, 45);
        assert_eq!(cfg.rest_seconds, 15);
        assert_eq!(cfg.total_rounds, 3);
        assert!(cfg.sound_enabled);
    }
}
