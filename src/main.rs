//! textile-signup: coming-soon signup page for The Textile Co.
//!
//! Runs the page in the terminal and provides:
//! - Synthesized hover, click, focus and confirmation cues
//! - A submission state machine around `POST /api/subscribe`
//! - Live or test-mode transport, chosen by configuration
//!
//! Out of scope:
//! - Serving the page assets, CORS, health checks
//! - Relaying to the audience provider (done by the backend)

mod api;
mod audio;
mod config;
mod events;
mod input;
mod lifecycle;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::build_transport;
use crate::audio::{AudioFeedback, OutputSettings};
use crate::config::Config;
use crate::events::SubscriptionEvent;
use crate::input::{InputEvent, InputListener};
use crate::lifecycle::ShutdownSignal;
use crate::state::SubmissionController;
use crate::ui::{Flow, LandingPage};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the page
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "textile-signup starting"
    );

    // Load configuration
    let config = Config::load()?;
    info!(endpoint = %config.endpoint, mode = ?config.mode, "configuration loaded");

    let mut shutdown = ShutdownSignal::new()?;

    // Input listener -> page
    let (input_tx, mut input_rx) = mpsc::channel(32);
    // Controller -> page (phase changes)
    let (event_tx, mut event_rx) = broadcast::channel::<SubscriptionEvent>(64);

    let audio = Arc::new(AudioFeedback::new(OutputSettings {
        open_device: config.audio_device,
        sample_rate: config.sample_rate,
    }));

    let controller = SubmissionController::new(build_transport(&config), audio.clone(), event_tx);

    let mut page = LandingPage::new(audio, controller.clone(), std::io::stdout());
    page.render_intro()?;

    let input_listener = InputListener::new(input_tx);
    input_listener.start()?;

    info!("page ready, entering main loop");

    let shutdown_wait = shutdown.wait();
    tokio::pin!(shutdown_wait);

    loop {
        tokio::select! {
            input = input_rx.recv() => {
                match input {
                    Some(InputEvent::Command(event)) => {
                        if page.handle(event)? == Flow::Quit {
                            info!("quit requested");
                            break;
                        }
                    }
                    Some(InputEvent::Rejected(e)) => page.show_input_error(&e)?,
                    Some(InputEvent::Closed) | None => {
                        info!("input closed");
                        // Let a piped submission finish, unless a signal arrives first
                        if controller.settled_or(&mut shutdown_wait).await.is_none() {
                            info!("shutdown signal received");
                            break;
                        }
                        while let Ok(event) = event_rx.try_recv() {
                            page.on_event(&event)?;
                        }
                        break;
                    }
                }
            }

            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        info!(%event, "subscription event");
                        page.on_event(&event)?;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscription event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            _ = &mut shutdown_wait => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("shutting down...");
    if input_listener.is_running() {
        input_listener.stop();
    }
    info!("textile-signup stopped");

    Ok(())
}
