mod engine;
mod schedule;
mod synth;
mod tone;

#[cfg(feature = "audio")]
mod device;

pub use engine::{AudioOutput, CueEngine, Haptics, NoHaptics, NoOutput, OutputFactory, OutputStatus};
pub use schedule::{countdown_cue, cues_for_tick, transition_cue, COUNTDOWN_FROM};
pub use synth::{oscillator, render, DEFAULT_SAMPLE_RATE};
pub use tone::{Cue, CueEvent, Waveform, FINISH_VIBRATION, RELEASE_TAIL};

#[cfg(feature = "audio")]
pub use device::DeviceOutput;
