use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One audio/haptic trigger. Built at a transition point, consumed at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueEvent {
    pub frequency_hz: f32,
    pub duration_seconds: f32,
    pub waveform: Waveform,
    /// Delay before the tone starts, relative to the moment the cue fires.
    #[serde(default)]
    pub offset_seconds: f32,
    /// Vibration pattern in milliseconds, alternating on/off.
    #[serde(default)]
    pub vibration_pattern: Option<Vec<u32>>,
}

impl CueEvent {
    pub fn tone(frequency_hz: f32, duration_seconds: f32, waveform: Waveform) -> Self {
        Self {
            frequency_hz,
            duration_seconds,
            waveform,
            offset_seconds: 0.0,
            vibration_pattern: None,
        }
    }

    pub fn at(mut self, offset_seconds: f32) -> Self {
        self.offset_seconds = offset_seconds;
        self
    }

    pub fn with_vibration(mut self, pattern: Vec<u32>) -> Self {
        self.vibration_pattern = Some(pattern);
        self
    }
}

/// The fixed cue vocabulary of an interval session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Short high pip on the last three seconds of every phase.
    Countdown,
    /// Start of a work interval.
    Go,
    /// Start of a rest interval.
    RestStart,
    /// Two-tone fanfare plus a vibration burst.
    Finish,
}

pub const FINISH_VIBRATION: [u32; 5] = [200, 100, 200, 100, 400];

/// Extra time to keep an output open after a cue so its release is not cut.
pub const RELEASE_TAIL: Duration = Duration::from_millis(150);

impl Cue {
    pub fn events(self) -> Vec<CueEvent> {
        match self {
            Cue::Countdown => vec![CueEvent::tone(880.0, 0.12, Waveform::Sine)],
            Cue::Go => vec![CueEvent::tone(1320.0, 0.35, Waveform::Square)],
            Cue::RestStart => vec![CueEvent::tone(330.0, 0.45, Waveform::Sawtooth)],
            Cue::Finish => vec![
                CueEvent::tone(784.0, 0.3, Waveform::Sine).with_vibration(FINISH_VIBRATION.to_vec()),
                CueEvent::tone(1046.5, 0.5, Waveform::Sine).at(0.3),
            ],
        }
    }

    /// From the first onset until the last tone ends, to the millisecond.
    pub fn length(self) -> Duration {
        let seconds = self
            .events()
            .iter()
            .map(|e| e.offset_seconds + e.duration_seconds)
            .fold(0.0_f32, f32::max);
        Duration::from_millis((seconds * 1000.0).round() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_is_higher_than_rest() {
        let go = &Cue::Go.events()[0];
        let rest = &Cue::RestStart.events()[0];
        assert!(go.frequency_hz > rest.frequency_hz);
        assert_eq!(go.waveform, Waveform::Square);
        assert_eq!(rest.waveform, Waveform::Sawtooth);
    }

    #[test]
    fn finish_is_two_tones_with_one_vibration() {
        let events = Cue::Finish.events();
        assert_eq!(events.len(), 2);
        assert!(events[1].offset_seconds >= events[0].duration_seconds);
        let vibrations = events.iter().filter(|e| e.vibration_pattern.is_some()).count();
        assert_eq!(vibrations, 1);
    }

    #[test]
    fn length_covers_the_delayed_tone() {
        assert_eq!(Cue::Finish.length(), Duration::from_millis(800));
        assert_eq!(Cue::Countdown.length(), Duration::from_millis(120));
    }
}
