//! Signal primitives for cue synthesis
//!
//! Oscillators, exponential parameter ramps, a decaying noise burst and a
//! biquad bandpass. Ramp semantics follow the usual audio-param model: the
//! value moves geometrically from `from` to `to` over the ramp length and
//! then holds `to`.

use std::f32::consts::TAU;

use rand::Rng;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// Phase-accumulating oscillator with per-sample frequency
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    /// Normalized phase in [0, 1)
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self { waveform, phase: 0.0 }
    }

    /// Produce one sample in [-1, 1] and advance by `freq_hz`
    pub fn next(&mut self, freq_hz: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase = (self.phase + freq_hz / sample_rate).fract();
        value
    }
}

/// Exponential ramp between two positive values
#[derive(Debug, Clone, Copy)]
pub struct ExpRamp {
    from: f32,
    to: f32,
    length_secs: f32,
}

impl ExpRamp {
    pub fn new(from: f32, to: f32, length_secs: f32) -> Self {
        debug_assert!(from > 0.0 && to > 0.0, "exponential ramps need positive endpoints");
        Self { from, to, length_secs }
    }

    /// Value at `t` seconds after the ramp starts
    pub fn at(&self, t: f32) -> f32 {
        if t <= 0.0 {
            self.from
        } else if t >= self.length_secs {
            self.to
        } else {
            self.from * (self.to / self.from).powf(t / self.length_secs)
        }
    }
}

/// White noise shaped by `exp(-i / (len * decay_fraction))`
pub fn decaying_noise<R: Rng + ?Sized>(len: usize, decay_fraction: f32, rng: &mut R) -> Vec<f32> {
    let time_constant = (len as f32 * decay_fraction).max(1.0);
    (0..len)
        .map(|i| rng.gen_range(-1.0f32..1.0) * (-(i as f32) / time_constant).exp())
        .collect()
}

/// Biquad bandpass with constant 0 dB peak gain
#[derive(Debug, Clone)]
pub struct Bandpass {
    b0: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Bandpass {
    pub fn new(center_hz: f32, q: f32, sample_rate: f32) -> Self {
        let w0 = TAU * center_hz / sample_rate;
        let alpha = w0.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: -2.0 * w0.cos() / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        // b1 is zero for this response
        let y = self.b0 * x + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn test_sine_frequency() {
        let sr = 48_000.0;
        let mut osc = Oscillator::new(Waveform::Sine);
        let samples: Vec<f32> = (0..48_000).map(|_| osc.next(440.0, sr)).collect();
        let crossings = zero_crossings(&samples);
        // Two crossings per cycle
        assert!((878..=882).contains(&crossings), "crossings = {crossings}");
    }

    #[test]
    fn test_square_is_bipolar_unit() {
        let mut osc = Oscillator::new(Waveform::Square);
        for _ in 0..1000 {
            let s = osc.next(150.0, 48_000.0);
            assert!(s == 1.0 || s == -1.0);
        }
    }

    #[test]
    fn test_exp_ramp_endpoints() {
        let ramp = ExpRamp::new(800.0, 400.0, 0.03);
        assert_eq!(ramp.at(0.0), 800.0);
        assert_eq!(ramp.at(0.03), 400.0);
        assert_eq!(ramp.at(1.0), 400.0);
        // Geometric midpoint
        assert!((ramp.at(0.015) - 565.685).abs() < 0.01);
    }

    #[test]
    fn test_decaying_noise_envelope() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = decaying_noise(4000, 0.3, &mut rng);
        assert_eq!(noise.len(), 4000);
        for (i, s) in noise.iter().enumerate() {
            let bound = (-(i as f32) / 1200.0).exp();
            assert!(s.abs() <= bound + 1e-6);
        }
    }

    #[test]
    fn test_bandpass_passes_center_rejects_far() {
        let sr = 48_000.0;
        let rms_through = |freq: f32| {
            let mut filter = Bandpass::new(1000.0, 0.5, sr);
            let mut osc = Oscillator::new(Waveform::Sine);
            let out: Vec<f32> = (0..9600)
                .map(|_| filter.process(osc.next(freq, sr)))
                .skip(4800)
                .collect();
            (out.iter().map(|s| s * s).sum::<f32>() / out.len() as f32).sqrt()
        };

        let center = rms_through(1000.0);
        let low = rms_through(40.0);
        assert!((center - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05, "center rms = {center}");
        assert!(low < center * 0.2, "low rms = {low}");
    }
}
