//! Submission controller
//!
//! Owns the form state, issues the single subscribe request per attempt and
//! publishes every phase change. `submit` enters Submitting before it
//! returns; the request runs on a spawned task that always settles the
//! attempt into Succeeded or Failed.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crate::api::{Accepted, RequestError, SubscribeRequest, SubscribeTransport};
use crate::audio::CuePlayer;
use crate::events::SubscriptionEvent;

use super::machine::{Phase, SubmitError, SubscriptionState};

struct Inner {
    state: SubscriptionState,
    /// When the in-flight attempt started
    submitted_at: Option<Instant>,
}

struct Shared {
    inner: Mutex<Inner>,
    transport: Arc<dyn SubscribeTransport>,
    cues: Arc<dyn CuePlayer>,
    event_tx: broadcast::Sender<SubscriptionEvent>,
    phase_tx: watch::Sender<Phase>,
}

/// Drives the signup form through its lifecycle
#[derive(Clone)]
pub struct SubmissionController {
    shared: Arc<Shared>,
}

impl SubmissionController {
    /// Create a controller in Idle
    pub fn new(
        transport: Arc<dyn SubscribeTransport>,
        cues: Arc<dyn CuePlayer>,
        event_tx: broadcast::Sender<SubscriptionEvent>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: SubscriptionState::default(),
                    submitted_at: None,
                }),
                transport,
                cues,
                event_tx,
                phase_tx,
            }),
        }
    }

    pub fn phase(&self) -> Phase {
        self.shared.inner.lock().state.phase()
    }

    /// Copy of the current form state
    pub fn snapshot(&self) -> SubscriptionState {
        self.shared.inner.lock().state.clone()
    }

    /// Receive every phase change as it happens
    pub fn subscribe(&self) -> broadcast::Receiver<SubscriptionEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Update the typed address; refused while submitting or after success
    pub fn set_email(&self, email: impl Into<String>) -> Result<(), SubmitError> {
        self.shared.inner.lock().state.set_email(email.into())
    }

    /// Start a submission of `email`
    ///
    /// On `Ok` the phase is already Submitting. On `Err` nothing changed and
    /// no request was sent. Must be called inside a tokio runtime.
    pub fn submit(&self, email: impl Into<String>) -> Result<(), SubmitError> {
        let email = {
            let mut inner = self.shared.inner.lock();

            // Validate on a copy so a refused submit leaves the form untouched
            let mut next = inner.state.clone();
            next.set_email(email.into())?;
            let email = next.begin()?;
            inner.state = next;
            inner.submitted_at = Some(Instant::now());

            info!(%email, "submitting subscription");
            self.publish(Phase::Submitting, SubscriptionEvent::SubmitStarted {
                email: email.clone(),
            });
            email
        };

        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = controller.send_request(email).await;
            controller.complete(outcome);
        });

        Ok(())
    }

    /// Wait until no submission is in flight and return the phase
    pub async fn settled(&self) -> Phase {
        let mut phase_rx = self.shared.phase_tx.subscribe();
        let settled = phase_rx
            .wait_for(|phase| *phase != Phase::Submitting)
            .await
            .map(|phase| *phase);
        settled.unwrap_or_else(|_| self.phase())
    }

    /// Like `settled`, but gives up when `cancel` completes first
    ///
    /// Returns `None` if cancelled while a submission was still in flight.
    pub async fn settled_or<F>(&self, cancel: F) -> Option<Phase>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            phase = self.settled() => Some(phase),
            _ = cancel => None,
        }
    }

    /// Run the transport on its own task so a panic still settles the attempt
    async fn send_request(&self, email: String) -> Result<Accepted, RequestError> {
        let transport = Arc::clone(&self.shared.transport);
        let request = SubscribeRequest { email };

        match tokio::spawn(async move { transport.subscribe(&request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(?e, "subscribe task aborted");
                Err(RequestError::Connectivity(e.to_string()))
            }
        }
    }

    fn complete(&self, outcome: Result<Accepted, RequestError>) {
        let mut inner = self.shared.inner.lock();
        let duration_ms = inner
            .submitted_at
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        // Phase and event go out under the lock, in state order
        match outcome {
            Ok(accepted) => {
                if !inner.state.succeed() {
                    return;
                }
                info!(id = ?accepted.id, duration_ms, "subscription accepted");
                self.shared.cues.play_submit();
                self.publish(Phase::Succeeded, SubscriptionEvent::Subscribed {
                    id: accepted.id,
                    message: accepted.message,
                    duration_ms,
                });
            }
            Err(e) => {
                let message = e.user_message().to_string();
                if !inner.state.fail(message.clone()) {
                    return;
                }
                warn!(%e, duration_ms, "subscription failed");
                self.publish(Phase::Failed, SubscriptionEvent::SubmitFailed { message, duration_ms });
            }
        }
    }

    /// Caller must hold the state lock
    fn publish(&self, phase: Phase, event: SubscriptionEvent) {
        self.shared.phase_tx.send_replace(phase);
        let _ = self.shared.event_tx.send(event);
    }
}
