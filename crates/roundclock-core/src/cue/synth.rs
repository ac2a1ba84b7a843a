//! Procedural tone synthesis. No audio assets: every cue is rendered from
//! its frequency, duration and waveform into mono `f32` samples.

use std::f32::consts::TAU;

use super::tone::{CueEvent, Waveform};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Linear fade-in, keeps tone onsets click-free.
const ATTACK_SECONDS: f32 = 0.005;
/// Gain the exponential release decays to by the end of the tone.
const RELEASE_FLOOR: f32 = 0.01;

/// One sample of `waveform` at `cycle` (fraction of a period, 0.0..1.0).
pub fn oscillator(waveform: Waveform, cycle: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * cycle).sin(),
        Waveform::Square => {
            if cycle < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * cycle - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (cycle - 0.5).abs(),
    }
}

fn envelope(t: f32, duration: f32) -> f32 {
    if t < ATTACK_SECONDS {
        return t / ATTACK_SECONDS;
    }
    let tail = (duration - ATTACK_SECONDS).max(f32::EPSILON);
    let progress = ((t - ATTACK_SECONDS) / tail).clamp(0.0, 1.0);
    RELEASE_FLOOR.powf(progress)
}

/// Render `event` as mono samples at `volume` (clamped to 0.0..=1.0).
pub fn render(event: &CueEvent, sample_rate: u32, volume: f32) -> Vec<f32> {
    if event.frequency_hz <= 0.0 || event.duration_seconds <= 0.0 || sample_rate == 0 {
        return Vec::new();
    }
    let volume = volume.clamp(0.0, 1.0);
    let rate = sample_rate as f32;
    let len = (event.duration_seconds * rate).round() as usize;

    (0..len)
        .map(|i| {
            let t = i as f32 / rate;
            let cycle = (t * event.frequency_hz).fract();
            oscillator(event.waveform, cycle) * envelope(t, event.duration_seconds) * volume
        })
        .collect()
}
