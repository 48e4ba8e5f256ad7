//! Terminal rendition of the landing page
//!
//! Binds each interaction to its cue and, for submit, to the controller:
//! - row hover: hover cue
//! - row click: click cue
//! - field focus: focus cue
//! - submit button: click cue, then an asynchronous submission
//!
//! The first click of the session is the user gesture that activates audio.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::debug;

use crate::audio::AudioFeedback;
use crate::events::SubscriptionEvent;
use crate::input::{InputError, UiEvent};
use crate::state::{Phase, SubmissionController, SubmitError};

/// One entry in the preview collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub name: &'static str,
    pub tag: &'static str,
}

pub const COLLECTION: [Product; 8] = [
    Product { name: "Midnight Lattice, 400TC", tag: "SIGNATURE" },
    Product { name: "Deccan Damask, King", tag: "SIGNATURE" },
    Product { name: "Monsoon Grid, Queen", tag: "COMING" },
    Product { name: "Temple Geometry, Double-woven", tag: "COMING" },
    Product { name: "Desert Rose, Cotton Sateen", tag: "COMING" },
    Product { name: "Morning Fog, 600TC", tag: "COMING" },
    Product { name: "Paisley Heritage, Aurangabad", tag: "COMING" },
    Product { name: "Raised Diamond, King", tag: "COMING" },
];

const HERITAGE: [(&str, &str); 2] = [("5", "Generations"), ("35+", "Years")];

const SUCCESS_TEXT: &str = "REGISTERED. WE'LL BE IN TOUCH.";

/// Whether the page keeps running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The page: binds interactions and remembers the audio activation gesture
pub struct LandingPage<W: Write> {
    audio: Arc<AudioFeedback>,
    controller: SubmissionController,
    out: W,
    audio_activated: bool,
}

impl<W: Write> LandingPage<W> {
    pub fn new(audio: Arc<AudioFeedback>, controller: SubmissionController, out: W) -> Self {
        Self {
            audio,
            controller,
            out,
            audio_activated: false,
        }
    }

    /// Print the static parts of the page
    pub fn render_intro(&mut self) -> io::Result<()> {
        writeln!(self.out, "The Textile Co.                                Est. 1990")?;
        writeln!(self.out)?;
        writeln!(self.out, "COLLECTION (Preview)")?;
        for (i, product) in COLLECTION.iter().enumerate() {
            writeln!(self.out, "  {:>2}. {:<32} {}", i + 1, product.name, product.tag)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "HERITAGE")?;
        for (value, label) in HERITAGE {
            writeln!(self.out, "  {value:>3} {label}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "LAT: 19.8762° N")?;
        writeln!(self.out, "LON: 75.3433° E")?;
        writeln!(self.out, "STATUS: PENDING")?;
        writeln!(self.out)?;
        writeln!(self.out, "PRINT FADES.")?;
        writeln!(self.out, "JACQUARD STAYS_")?;
        writeln!(self.out, "Weaving modern utility with archival precision. A new standard in structural soft-goods.")?;
        writeln!(self.out)?;
        writeln!(self.out, "Get notified when we launch")?;
        writeln!(
            self.out,
            "commands: hover <n> | click <n> | focus | type <email> | submit [email] | quit"
        )?;
        self.out.flush()
    }

    /// Apply one interaction
    pub fn handle(&mut self, event: UiEvent) -> io::Result<Flow> {
        debug!(?event, "ui event");

        match event {
            UiEvent::RowHover(row) => {
                if self.product(row)?.is_some() {
                    self.audio.play_hover();
                }
            }
            UiEvent::RowClick(row) => {
                self.activate_audio();
                if let Some(product) = self.product(row)? {
                    self.audio.play_click();
                    writeln!(self.out, "{} ({})", product.name, product.tag)?;
                }
            }
            UiEvent::FieldFocus => {
                if self.form_open() {
                    self.audio.play_focus();
                }
            }
            UiEvent::Input(email) => {
                // Disabled inputs swallow edits.
                if let Err(e) = self.controller.set_email(email) {
                    debug!(%e, "edit ignored");
                }
            }
            UiEvent::Submit(email) => self.press_submit(email)?,
            UiEvent::Quit => return Ok(Flow::Quit),
        }

        self.out.flush()?;
        Ok(Flow::Continue)
    }

    /// Render a phase change from the controller
    pub fn on_event(&mut self, event: &SubscriptionEvent) -> io::Result<()> {
        match event {
            SubscriptionEvent::SubmitStarted { .. } => writeln!(self.out, "...")?,
            SubscriptionEvent::Subscribed { .. } => writeln!(self.out, "{SUCCESS_TEXT}")?,
            SubscriptionEvent::SubmitFailed { message, .. } => writeln!(self.out, "{message}")?,
        }
        self.out.flush()
    }

    pub fn show_input_error(&mut self, error: &InputError) -> io::Result<()> {
        writeln!(self.out, "? {error}")?;
        self.out.flush()
    }

    fn press_submit(&mut self, email: Option<String>) -> io::Result<()> {
        // The button is disabled while submitting and gone after success.
        if !self.form_open() {
            return Ok(());
        }

        self.activate_audio();
        self.audio.play_click();

        let email = email.unwrap_or_else(|| self.controller.snapshot().email().to_string());
        match self.controller.submit(email) {
            Ok(()) => {}
            Err(SubmitError::EmptyEmail) => writeln!(self.out, "Enter email address")?,
            Err(e) => debug!(%e, "submit ignored"),
        }
        Ok(())
    }

    fn activate_audio(&mut self) {
        if !self.audio_activated {
            self.audio_activated = true;
            self.audio.init_audio();
        }
    }

    fn form_open(&self) -> bool {
        matches!(self.controller.phase(), Phase::Idle | Phase::Failed)
    }

    fn product(&mut self, row: usize) -> io::Result<Option<Product>> {
        let product = COLLECTION.get(row).copied();
        if product.is_none() {
            writeln!(self.out, "? no row {}", row + 1)?;
        }
        Ok(product)
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    use tokio::sync::broadcast;

    use crate::api::TestModeTransport;
    use crate::audio::OutputSettings;

    fn page() -> (LandingPage<Vec<u8>>, Arc<AudioFeedback>, SubmissionController) {
        let slot = Box::leak(Box::new(OnceLock::new()));
        let audio = Arc::new(AudioFeedback::with_slot(
            slot,
            OutputSettings {
                open_device: false,
                sample_rate: 48_000,
            },
        ));
        let (event_tx, _) = broadcast::channel(16);
        let controller =
            SubmissionController::new(Arc::new(TestModeTransport), audio.clone(), event_tx);
        let page = LandingPage::new(audio.clone(), controller.clone(), Vec::new());
        (page, audio, controller)
    }

    fn text(page: &LandingPage<Vec<u8>>) -> String {
        String::from_utf8_lossy(page.output()).into_owned()
    }

    fn voices(audio: &AudioFeedback) -> usize {
        audio.output().map(|o| o.active_voices()).unwrap_or(0)
    }

    #[test]
    fn test_intro_lists_collection() {
        let (mut page, _, _) = page();
        page.render_intro().unwrap();
        let out = text(&page);
        assert!(out.contains(" 1. Midnight Lattice, 400TC"));
        assert!(out.contains(" 8. Raised Diamond, King"));
        assert!(out.contains("Get notified when we launch"));
    }

    #[test]
    fn test_intro_shows_heritage_and_meta() {
        let (mut page, _, _) = page();
        page.render_intro().unwrap();
        let out = text(&page);
        assert!(out.contains("HERITAGE"));
        assert!(out.contains("  5 Generations"));
        assert!(out.contains("35+ Years"));
        assert!(out.contains("LAT: 19.8762° N"));
        assert!(out.contains("LON: 75.3433° E"));
        assert!(out.contains("STATUS: PENDING"));
    }

    #[test]
    fn test_hover_before_first_click_is_silent() {
        let (mut page, audio, _) = page();
        page.handle(UiEvent::RowHover(0)).unwrap();
        page.handle(UiEvent::FieldFocus).unwrap();
        assert!(audio.output().is_none());
    }

    #[test]
    fn test_first_click_activates_audio() {
        let (mut page, audio, _) = page();
        page.handle(UiEvent::RowClick(2)).unwrap();
        assert_eq!(voices(&audio), 1);
        assert!(text(&page).contains("Monsoon Grid, Queen (COMING)"));

        page.handle(UiEvent::RowHover(3)).unwrap();
        page.handle(UiEvent::FieldFocus).unwrap();
        assert_eq!(voices(&audio), 3);
    }

    #[test]
    fn test_unknown_row_plays_nothing() {
        let (mut page, audio, _) = page();
        page.handle(UiEvent::RowClick(0)).unwrap();
        page.handle(UiEvent::RowHover(42)).unwrap();
        assert_eq!(voices(&audio), 1);
        assert!(text(&page).contains("? no row 43"));
    }

    #[test]
    fn test_quit() {
        let (mut page, _, _) = page();
        assert_eq!(page.handle(UiEvent::Quit).unwrap(), Flow::Quit);
    }

    #[tokio::test]
    async fn test_empty_submit_prompts() {
        let (mut page, _, controller) = page();
        page.handle(UiEvent::Submit(None)).unwrap();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(text(&page).contains("Enter email address"));
    }

    #[tokio::test]
    async fn test_typed_email_submits_and_confirms() {
        let (mut page, audio, controller) = page();
        let mut events = controller.subscribe();

        page.handle(UiEvent::Input("weaver@example.com".into())).unwrap();
        page.handle(UiEvent::Submit(None)).unwrap();
        assert_eq!(controller.phase(), Phase::Submitting);

        // Disabled while in flight: no click, no edit
        page.handle(UiEvent::Submit(None)).unwrap();
        page.handle(UiEvent::Input("other@example.com".into())).unwrap();
        assert_eq!(controller.snapshot().email(), "weaver@example.com");

        assert_eq!(controller.settled().await, Phase::Succeeded);
        while let Ok(event) = events.try_recv() {
            page.on_event(&event).unwrap();
        }

        let out = text(&page);
        assert!(out.contains("..."));
        assert!(out.contains(SUCCESS_TEXT));
        // Button click plus confirmation tone
        assert_eq!(voices(&audio), 2);
    }

    #[test]
    fn test_failure_is_rendered_inline() {
        let (mut page, _, _) = page();
        page.on_event(&SubscriptionEvent::SubmitFailed {
            message: "Email is required".into(),
            duration_ms: 4,
        })
        .unwrap();
        assert!(text(&page).ends_with("Email is required\n"));
    }

    #[test]
    fn test_input_error_is_rendered() {
        let (mut page, _, _) = page();
        page.show_input_error(&InputError::UnknownCommand("dance".into()))
            .unwrap();
        assert!(text(&page).contains("? unknown command 'dance'"));
    }
}
