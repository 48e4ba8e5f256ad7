//! Stdin listener
//!
//! Runs on a dedicated thread because stdin reads block. Parsed commands
//! are forwarded to the async side over an mpsc channel.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::command::{InputError, UiEvent};

/// Events sent from the listener to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A valid command
    Command(UiEvent),
    /// A line that did not parse
    Rejected(InputError),
    /// Stdin reached end of file
    Closed,
}

/// Reads commands from stdin until stopped or EOF
pub struct InputListener {
    event_tx: mpsc::Sender<InputEvent>,
    running: Arc<AtomicBool>,
}

impl InputListener {
    /// Create a new input listener
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the reader thread
    pub fn start(&self) -> Result<(), ListenerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!("input listener thread started");
                let stdin = std::io::stdin();
                forward_lines(stdin.lock(), &event_tx, &running);
                running.store(false, Ordering::SeqCst);
                info!("input listener thread stopped");
            })
            .map_err(|e| ListenerError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Stop forwarding; takes effect after the next line
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur starting the listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("input listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),
}

/// Parse each line of `reader` and forward it until EOF, stop or a closed channel
fn forward_lines<R: BufRead>(reader: R, event_tx: &mpsc::Sender<InputEvent>, running: &AtomicBool) {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read input line");
                break;
            }
        };

        let event = match UiEvent::parse(&line) {
            Ok(Some(event)) => InputEvent::Command(event),
            Ok(None) => continue,
            Err(e) => InputEvent::Rejected(e),
        };

        debug!(?event, "input event");
        if event_tx.blocking_send(event).is_err() {
            warn!("failed to send input event - channel closed?");
            return;
        }
    }

    let _ = event_tx.blocking_send(InputEvent::Closed);
}
