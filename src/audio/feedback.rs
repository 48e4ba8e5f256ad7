//! Fire-and-forget cue playback on the shared output

use std::sync::OnceLock;

use tracing::trace;

use super::cue::Cue;
use super::output::{shared_output, AudioOutput, OutputSettings, OutputState, Voice};

/// Something that can sound a cue without blocking the caller
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue);

    /// Confirmation tone after a successful signup
    fn play_submit(&self) {
        self.play(Cue::Submit);
    }
}

/// Plays the UI cues through the process-wide audio output
///
/// Nothing is audible until `init_audio` has run once; earlier calls are
/// dropped without error.
pub struct AudioFeedback {
    slot: &'static OnceLock<AudioOutput>,
    settings: OutputSettings,
}

impl AudioFeedback {
    pub fn new(settings: OutputSettings) -> Self {
        Self {
            slot: shared_output(),
            settings,
        }
    }

    /// Use a private slot instead of the process-wide one
    #[cfg(test)]
    pub(crate) fn with_slot(slot: &'static OnceLock<AudioOutput>, settings: OutputSettings) -> Self {
        Self { slot, settings }
    }

    /// Create the shared output if needed and resume it if suspended
    pub fn init_audio(&self) {
        AudioOutput::get_or_create(self.slot, self.settings).resume();
    }

    pub fn play_hover(&self) {
        self.play(Cue::Hover);
    }

    pub fn play_click(&self) {
        self.play(Cue::Click);
    }

    pub fn play_focus(&self) {
        self.play(Cue::Focus);
    }

    /// The output, if it has been created
    pub fn output(&self) -> Option<&AudioOutput> {
        self.slot.get()
    }
}

impl CuePlayer for AudioFeedback {
    fn play(&self, cue: Cue) {
        let Some(output) = self.output() else {
            trace!(%cue, "audio not initialized, dropping cue");
            return;
        };
        if output.state() != OutputState::Running {
            trace!(%cue, "audio suspended, dropping cue");
            return;
        }

        let samples = cue.render(output.sample_rate(), &mut rand::thread_rng());
        output.schedule(Voice::new(cue, samples));
    }
}
