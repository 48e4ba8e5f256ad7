//! Shared audio output
//!
//! One output per process, created lazily on the first user interaction and
//! kept for the rest of the session. It starts suspended; `resume` flips it
//! to running and, when a device is wanted, opens the hardware stream on a
//! dedicated `audio-output` thread that feeds from the mixer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::cue::Cue;

/// Voices beyond this evict the oldest one
const MAX_VOICES: usize = 32;

static SHARED_OUTPUT: OnceLock<AudioOutput> = OnceLock::new();

/// Slot holding the process-wide output
pub fn shared_output() -> &'static OnceLock<AudioOutput> {
    &SHARED_OUTPUT
}

/// How the output is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    /// Open the default hardware device on first resume
    pub open_device: bool,
    /// Render rate until the device reports its own
    pub sample_rate: u32,
}

/// Activation state of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Suspended,
    Running,
}

/// One rendered cue being played out
#[derive(Debug, Clone)]
pub struct Voice {
    cue: Cue,
    samples: Vec<f32>,
    position: usize,
}

impl Voice {
    pub fn new(cue: Cue, samples: Vec<f32>) -> Self {
        Self {
            cue,
            samples,
            position: 0,
        }
    }

    fn is_finished(&self) -> bool {
        self.position >= self.samples.len()
    }
}

/// Sums every active voice into the device buffer
#[derive(Debug, Default)]
pub struct Mixer {
    voices: VecDeque<Voice>,
}

impl Mixer {
    pub fn push(&mut self, voice: Voice) {
        if self.voices.len() >= MAX_VOICES {
            if let Some(evicted) = self.voices.pop_front() {
                debug!(cue = %evicted.cue, "voice limit reached, evicting oldest");
            }
        }
        self.voices.push_back(voice);
    }

    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Fill an interleaved buffer, writing the mono mix to every channel
    pub fn fill(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let mut sum = 0.0f32;
            for voice in self.voices.iter_mut() {
                if let Some(sample) = voice.samples.get(voice.position) {
                    sum += sample;
                    voice.position += 1;
                }
            }
            frame.fill(sum.clamp(-1.0, 1.0));
        }

        self.voices.retain(|voice| !voice.is_finished());
    }
}

/// The shared output every cue is appended to
pub struct AudioOutput {
    settings: OutputSettings,
    running: AtomicBool,
    sample_rate: AtomicU32,
    mixer: Arc<Mutex<Mixer>>,
}

impl AudioOutput {
    /// Create a suspended output
    pub fn new(settings: OutputSettings) -> Self {
        Self {
            settings,
            running: AtomicBool::new(false),
            sample_rate: AtomicU32::new(settings.sample_rate),
            mixer: Arc::new(Mutex::new(Mixer::default())),
        }
    }

    /// Get the output in `slot`, creating it on first use
    pub fn get_or_create(slot: &OnceLock<AudioOutput>, settings: OutputSettings) -> &AudioOutput {
        slot.get_or_init(|| {
            info!(?settings, "creating shared audio output");
            AudioOutput::new(settings)
        })
    }

    pub fn state(&self) -> OutputState {
        if self.running.load(Ordering::SeqCst) {
            OutputState::Running
        } else {
            OutputState::Suspended
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::SeqCst)
    }

    /// Resume if suspended. Returns whether this call did the resume.
    pub fn resume(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }

        info!("audio output resumed");
        if self.settings.open_device {
            self.open_device();
        }
        true
    }

    /// Append a voice. Dropped while suspended.
    pub fn schedule(&self, voice: Voice) -> bool {
        if self.state() != OutputState::Running {
            return false;
        }
        self.mixer.lock().push(voice);
        true
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.lock().active()
    }

    #[cfg(test)]
    pub(crate) fn mixer(&self) -> &Arc<Mutex<Mixer>> {
        &self.mixer
    }

    /// Open the default device; failures leave the output running silently
    fn open_device(&self) {
        let host = cpal::default_host();
        let Some(device) = host.default_output_device() else {
            warn!("no audio output device found, cues will be silent");
            return;
        };

        let config = match device.default_output_config() {
            Ok(config) => config,
            Err(e) => {
                warn!(%e, "failed to get audio output config, cues will be silent");
                return;
            }
        };

        // Render at the device rate from here on.
        self.sample_rate.store(config.sample_rate().0, Ordering::SeqCst);

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate = config.sample_rate().0,
            channels = config.channels(),
            "opening audio output"
        );

        let mixer = Arc::clone(&self.mixer);
        let spawned = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || run_stream(device, config, mixer));

        if let Err(e) = spawned {
            warn!(%e, "failed to spawn audio output thread");
        }
    }
}

/// Build and hold the hardware stream for the rest of the process
fn run_stream(device: cpal::Device, config: cpal::SupportedStreamConfig, mixer: Arc<Mutex<Mixer>>) {
    let channels = config.channels() as usize;

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            mixer.lock().fill(data, channels);
        },
        |err| warn!(%err, "audio stream error"),
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            warn!(%e, "failed to build audio stream");
            return;
        }
    };

    if let Err(e) = stream.play() {
        warn!(%e, "failed to start audio stream");
        return;
    }

    debug!("audio stream playing");

    // The output is never torn down; park to keep the stream alive.
    loop {
        thread::park();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OutputSettings {
        OutputSettings {
            open_device: false,
            sample_rate: 48_000,
        }
    }

    #[test]
    fn test_output_starts_suspended() {
        let output = AudioOutput::new(settings());
        assert_eq!(output.state(), OutputState::Suspended);
        assert!(!output.schedule(Voice::new(Cue::Hover, vec![0.1; 10])));
        assert_eq!(output.active_voices(), 0);
    }

    #[test]
    fn test_resume_is_idempotent() {
        let output = AudioOutput::new(settings());
        assert!(output.resume());
        assert!(!output.resume());
        assert_eq!(output.state(), OutputState::Running);
        assert_eq!(output.sample_rate(), 48_000);
    }

    #[test]
    fn test_get_or_create_returns_same_output() {
        let slot = OnceLock::new();
        let first = AudioOutput::get_or_create(&slot, settings()) as *const AudioOutput;
        let second = AudioOutput::get_or_create(&slot, settings()) as *const AudioOutput;
        assert_eq!(first, second);
    }

    #[test]
    fn test_mixer_sums_overlapping_voices() {
        let mut mixer = Mixer::default();
        mixer.push(Voice::new(Cue::Hover, vec![0.25; 4]));
        mixer.push(Voice::new(Cue::Click, vec![0.5; 2]));

        let mut out = vec![0.0; 8];
        mixer.fill(&mut out, 2);
        assert_eq!(out, vec![0.75, 0.75, 0.75, 0.75, 0.25, 0.25, 0.25, 0.25]);
        assert_eq!(mixer.active(), 0);
    }

    #[test]
    fn test_mixer_outputs_silence_when_empty() {
        let mut mixer = Mixer::default();
        let mut out = vec![1.0; 6];
        mixer.fill(&mut out, 1);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mixer_keeps_unfinished_voices() {
        let mut mixer = Mixer::default();
        mixer.push(Voice::new(Cue::Submit, vec![0.1; 10]));
        let mut out = vec![0.0; 4];
        mixer.fill(&mut out, 1);
        assert_eq!(mixer.active(), 1);
    }

    #[test]
    fn test_mixer_evicts_oldest_over_limit() {
        let mut mixer = Mixer::default();
        for _ in 0..MAX_VOICES + 5 {
            mixer.push(Voice::new(Cue::Hover, vec![0.0; 4]));
        }
        assert_eq!(mixer.active(), MAX_VOICES);
    }

    #[test]
    fn test_mixer_clamps_sum() {
        let mut mixer = Mixer::default();
        for _ in 0..4 {
            mixer.push(Voice::new(Cue::Click, vec![0.4]));
        }
        let mut out = vec![0.0; 1];
        mixer.fill(&mut out, 1);
        assert_eq!(out[0], 1.0);
    }
}
