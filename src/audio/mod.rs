//! Audio feedback engine
//!
//! Synthesizes the four UI cues on demand:
//! - Hover: short sine sweep, 800 to 400 Hz
//! - Click: square sweep, 150 to 80 Hz
//! - Focus: bandpassed noise burst around 1 kHz
//! - Submit: sine tone stepping from 440 to 554 Hz
//!
//! Cues mix into a single lazily created output that stays up for the
//! whole session.

mod cue;
mod feedback;
mod output;
mod synth;

#[cfg(test)]
pub use cue::Cue;
pub use feedback::{AudioFeedback, CuePlayer};
pub use output::OutputSettings;
