//! cpal-backed audio output.
//!
//! Tones are mixed in the stream callback from a shared voice list. The
//! stream is built paused and only starts playing on `resume()`, which the
//! cue engine issues from the start gesture.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{debug, error, info};

use super::engine::{AudioOutput, OutputStatus};
use crate::error::CueError;

struct Voice {
    samples: Vec<f32>,
    /// Frames of silence left before the first sample.
    delay: usize,
    position: usize,
}

impl Voice {
    fn next(&mut self) -> Option<f32> {
        if self.delay > 0 {
            self.delay -= 1;
            return Some(0.0);
        }
        let sample = self.samples.get(self.position).copied();
        self.position += 1;
        sample
    }
}

type Voices = Arc<Mutex<Vec<Voice>>>;

fn lock(voices: &Voices) -> MutexGuard<'_, Vec<Voice>> {
    voices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Default output device of the default host.
pub struct DeviceOutput {
    stream: Option<Stream>,
    voices: Voices,
    sample_rate: u32,
    status: OutputStatus,
}

impl DeviceOutput {
    /// Open the default output device, at `preferred_rate` when the device
    /// supports it and at its default configuration otherwise.
    ///
    /// # Errors
    ///
    /// `CueError::Unavailable` when there is no output device or its sample
    /// format is unsupported, `CueError::Device` when the stream cannot be
    /// built or paused.
    pub fn open(preferred_rate: u32) -> Result<Self, CueError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| CueError::Unavailable("no default output device".into()))?;
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = match config_at_rate(&device, preferred_rate) {
            Some(config) => config,
            None => {
                debug!(preferred_rate, "preferred rate unsupported, using device default");
                device
                    .default_output_config()
                    .map_err(|e| CueError::Unavailable(format!("no usable output config: {e}")))?
            }
        };
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let voices: Voices = Arc::new(Mutex::new(Vec::new()));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(&voices))?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(&voices))?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(&voices))?,
            other => {
                return Err(CueError::Unavailable(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        };
        stream
            .pause()
            .map_err(|e| CueError::Device(format!("failed to pause new stream: {e}")))?;

        info!(
            device = %name,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio device opened"
        );

        Ok(Self {
            stream: Some(stream),
            voices,
            sample_rate: config.sample_rate.0,
            status: OutputStatus::Suspended,
        })
    }

    /// Factory for [`CueEngine::new`](super::CueEngine::new).
    pub fn factory(preferred_rate: u32) -> impl FnMut() -> Result<Box<dyn AudioOutput>, CueError> {
        move || DeviceOutput::open(preferred_rate).map(|output| Box::new(output) as Box<dyn AudioOutput>)
    }
}

fn config_at_rate(device: &cpal::Device, rate: u32) -> Option<cpal::SupportedStreamConfig> {
    let wanted = cpal::SampleRate(rate);
    device
        .supported_output_configs()
        .ok()?
        .filter(|range| range.min_sample_rate() <= wanted && wanted <= range.max_sample_rate())
        .find(|range| range.sample_format() == SampleFormat::F32)
        .map(|range| range.with_sample_rate(wanted))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    voices: Voices,
) -> Result<Stream, CueError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut voices = lock(&voices);
                for frame in data.chunks_mut(channels) {
                    let mut mixed = 0.0f32;
                    voices.retain_mut(|voice| match voice.next() {
                        Some(sample) => {
                            mixed += sample;
                            true
                        }
                        None => false,
                    });
                    let value = T::from_sample(mixed.clamp(-1.0, 1.0));
                    for slot in frame.iter_mut() {
                        *slot = value;
                    }
                }
            },
            move |err| {
                error!("audio stream error: {err}");
            },
            None,
        )
        .map_err(|e| CueError::Device(format!("failed to build stream: {e}")))
}

impl AudioOutput for DeviceOutput {
    fn status(&self) -> OutputStatus {
        self.status
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), CueError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| CueError::Device("output closed".into()))?;
        stream
            .play()
            .map_err(|e| CueError::Device(format!("failed to resume stream: {e}")))?;
        self.status = OutputStatus::Running;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), CueError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| CueError::Device("output closed".into()))?;
        stream
            .pause()
            .map_err(|e| CueError::Device(format!("failed to suspend stream: {e}")))?;
        self.status = OutputStatus::Suspended;
        Ok(())
    }

    fn play(&mut self, samples: Vec<f32>, offset: Duration) -> Result<(), CueError> {
        if self.stream.is_none() {
            return Err(CueError::Playback("output closed".into()));
        }
        let delay = (offset.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        lock(&self.voices).push(Voice {
            samples,
            delay,
            position: 0,
        });
        Ok(())
    }

    fn stop_all(&mut self) {
        lock(&self.voices).clear();
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("pause on close failed: {e}");
            }
        }
        self.status = OutputStatus::Closed;
    }
}
