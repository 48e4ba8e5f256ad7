//! The four UI cues and their offline rendering
//!
//! Each render builds its own oscillator, filter and envelope, writes a
//! mono buffer and drops them again. Nothing carries over between calls.

use std::time::Duration;

use rand::Rng;

use super::synth::{decaying_noise, Bandpass, ExpRamp, Oscillator, Waveform};

/// Envelope floor every cue decays towards
const ENVELOPE_FLOOR: f32 = 0.001;

/// A short synthesized sound tied to one UI interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Soft typewriter tick when the pointer enters a list row
    Hover,
    /// Mechanical click on a row or button
    Click,
    /// Fabric rustle when the email field gains focus
    Focus,
    /// Two-step confirmation tone after a successful signup
    Submit,
}

impl Cue {
    #[cfg(test)]
    pub const ALL: [Cue; 4] = [Cue::Hover, Cue::Click, Cue::Focus, Cue::Submit];

    /// Length of the rendered buffer
    pub fn duration(self) -> Duration {
        match self {
            Cue::Hover => Duration::from_millis(50),
            Cue::Click => Duration::from_millis(100),
            Cue::Focus => Duration::from_millis(80),
            Cue::Submit => Duration::from_millis(200),
        }
    }

    /// Starting gain; no sample exceeds it
    pub fn peak(self) -> f32 {
        match self {
            Cue::Hover => 0.03,
            Cue::Click => 0.06,
            Cue::Focus => 0.04,
            Cue::Submit => 0.05,
        }
    }

    /// Render the cue as mono samples at `sample_rate`
    pub fn render<R: Rng + ?Sized>(self, sample_rate: u32, rng: &mut R) -> Vec<f32> {
        let sr = sample_rate as f32;
        let duration = self.duration().as_secs_f32();
        let len = (duration * sr).round() as usize;
        let gain = ExpRamp::new(self.peak(), ENVELOPE_FLOOR, duration);

        match self {
            Cue::Hover => {
                let pitch = ExpRamp::new(800.0, 400.0, 0.03);
                tone(Waveform::Sine, len, sr, |t| pitch.at(t), gain)
            }
            Cue::Click => {
                let pitch = ExpRamp::new(150.0, 80.0, 0.08);
                tone(Waveform::Square, len, sr, |t| pitch.at(t), gain)
            }
            Cue::Submit => tone(
                Waveform::Sine,
                len,
                sr,
                |t| if t < 0.1 { 440.0 } else { 554.0 },
                gain,
            ),
            Cue::Focus => {
                let mut filter = Bandpass::new(1000.0, 0.5, sr);
                decaying_noise(len, 0.3, rng)
                    .into_iter()
                    .enumerate()
                    .map(|(i, x)| {
                        // Filter ringing can overshoot unity on a noise spike.
                        let filtered = filter.process(x).clamp(-1.0, 1.0);
                        filtered * gain.at(i as f32 / sr)
                    })
                    .collect()
            }
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cue::Hover => write!(f, "hover"),
            Cue::Click => write!(f, "click"),
            Cue::Focus => write!(f, "focus"),
            Cue::Submit => write!(f, "submit"),
        }
    }
}

fn tone(
    waveform: Waveform,
    len: usize,
    sample_rate: f32,
    pitch: impl Fn(f32) -> f32,
    gain: ExpRamp,
) -> Vec<f32> {
    let mut osc = Oscillator::new(waveform);
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate;
            osc.next(pitch(t), sample_rate) * gain.at(t)
        })
        .collect()
}
