//! Cue playback and audio-output lifecycle.
//!
//! The output device is acquired lazily, only from [`CueEngine::unlock`],
//! which the session controller calls from `start()`: audio must never start
//! without a user action. Every failure past that point is logged and
//! dropped. A session without sound is still a correct session.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::synth;
use super::tone::{Cue, CueEvent, Waveform};
use crate::error::CueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Suspended,
    Running,
    Closed,
}

/// A platform audio output.
pub trait AudioOutput {
    fn status(&self) -> OutputStatus;

    fn sample_rate(&self) -> u32;

    fn resume(&mut self) -> Result<(), CueError>;

    fn suspend(&mut self) -> Result<(), CueError>;

    /// Queue mono samples to start `offset` from now.
    fn play(&mut self, samples: Vec<f32>, offset: Duration) -> Result<(), CueError>;

    /// Drop every queued or sounding tone.
    fn stop_all(&mut self);

    fn close(&mut self);
}

/// Creates the audio output on first use.
pub trait OutputFactory {
    fn acquire(&mut self) -> Result<Box<dyn AudioOutput>, CueError>;
}

impl<F> OutputFactory for F
where
    F: FnMut() -> Result<Box<dyn AudioOutput>, CueError>,
{
    fn acquire(&mut self) -> Result<Box<dyn AudioOutput>, CueError> {
        self()
    }
}

/// Factory for builds and hosts without an audio backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOutput;

impl OutputFactory for NoOutput {
    fn acquire(&mut self) -> Result<Box<dyn AudioOutput>, CueError> {
        Err(CueError::Unavailable("no audio backend configured".into()))
    }
}

/// Vibration support. Returns `false` when the platform has none.
pub trait Haptics {
    fn vibrate(&mut self, pattern: &[u32]) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: &[u32]) -> bool {
        false
    }
}

pub struct CueEngine {
    factory: Box<dyn OutputFactory>,
    output: Option<Box<dyn AudioOutput>>,
    haptics: Box<dyn Haptics>,
    sound_enabled: bool,
    volume: f32,
}

impl CueEngine {
    pub fn new(factory: impl OutputFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            output: None,
            haptics: Box::new(NoHaptics),
            sound_enabled: true,
            volume: 0.5,
        }
    }

    /// An engine that never produces sound or vibration.
    pub fn silent() -> Self {
        Self::new(NoOutput)
    }

    pub fn with_haptics(mut self, haptics: impl Haptics + 'static) -> Self {
        self.haptics = Box::new(haptics);
        self
    }

    /// Output gain, 0.0..=1.0.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Acquire and wake the audio output. Call only from a user action.
    pub fn unlock(&mut self) {
        if matches!(self.output.as_ref().map(|o| o.status()), Some(OutputStatus::Closed)) {
            self.output = None;
        }

        if self.output.is_none() {
            match self.factory.acquire() {
                Ok(output) => {
                    info!(sample_rate = output.sample_rate(), "audio output acquired");
                    self.output = Some(output);
                }
                Err(e) => {
                    warn!("audio output unavailable, continuing silently: {e}");
                    return;
                }
            }
        }

        if let Some(output) = self.output.as_mut() {
            if output.status() == OutputStatus::Suspended {
                if let Err(e) = output.resume() {
                    warn!("failed to resume audio output: {e}");
                }
            }
        }
    }

    pub fn play_tone(&mut self, frequency_hz: f32, duration_seconds: f32, waveform: Waveform) {
        self.play_event_tone(&CueEvent::tone(frequency_hz, duration_seconds, waveform));
    }

    /// Best effort; no-op without haptic support.
    pub fn vibrate(&mut self, pattern: &[u32]) {
        if !self.haptics.vibrate(pattern) {
            debug!("vibration unsupported, skipped");
        }
    }

    pub fn fire(&mut self, event: &CueEvent) {
        if let Some(pattern) = &event.vibration_pattern {
            self.vibrate(pattern);
        }
        self.play_event_tone(event);
    }

    pub fn play(&mut self, cue: Cue) {
        debug!(?cue, "cue");
        for event in cue.events() {
            self.fire(&event);
        }
    }

    /// Silence anything still sounding, keep the output.
    pub fn cancel(&mut self) {
        if let Some(output) = self.output.as_mut() {
            output.stop_all();
        }
    }

    /// Pause the output without giving it up. `unlock()` wakes it again.
    pub fn suspend(&mut self) {
        let Some(output) = self.output.as_mut() else {
            return;
        };
        if output.status() == OutputStatus::Running {
            output.stop_all();
            if let Err(e) = output.suspend() {
                warn!("failed to suspend audio output: {e}");
            }
        }
    }

    /// Close and drop the output. The next `unlock()` acquires a new one.
    pub fn release(&mut self) {
        if let Some(mut output) = self.output.take() {
            output.stop_all();
            output.close();
            debug!("audio output released");
        }
    }

    fn play_event_tone(&mut self, event: &CueEvent) {
        if !self.sound_enabled {
            return;
        }
        let Some(output) = self.output.as_mut() else {
            debug!("no audio output, tone skipped");
            return;
        };
        if output.status() != OutputStatus::Running {
            debug!(status = ?output.status(), "audio output not running, tone skipped");
            return;
        }

        let samples = synth::render(event, output.sample_rate(), self.volume);
        let offset = Duration::from_secs_f32(event.offset_seconds.max(0.0));
        if let Err(e) = output.play(samples, offset) {
            warn!("tone playback failed: {e}");
        }
    }
}

impl Drop for CueEngine {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueEngine")
            .field("has_output", &self.output.is_some())
            .field("sound_enabled", &self.sound_enabled)
            .field("volume", &self.volume)
            .finish()
    }
}
