//! Core subscription state machine
//!
//! Pure transitions between Idle, Submitting, Succeeded and Failed. The
//! controller wraps this with the network call and event emission.

use tracing::{debug, warn};

/// Lifecycle phase of the signup form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Request in flight; the form is disabled
    Submitting,
    /// Backend accepted the address (terminal)
    Succeeded,
    /// Last attempt failed; the user may retry
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Submitting => write!(f, "Submitting"),
            Phase::Succeeded => write!(f, "Succeeded"),
            Phase::Failed => write!(f, "Failed"),
        }
    }
}

/// Reasons a submit or edit is refused. None of them change the phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("email address is required")]
    EmptyEmail,

    #[error("a submission is already in flight")]
    InFlight,

    #[error("address already subscribed")]
    AlreadySubscribed,
}

/// Per-session form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionState {
    email: String,
    phase: Phase,
    /// Set exactly when `phase` is `Failed`
    error_message: Option<String>,
}

impl SubscriptionState {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Replace the typed address; frozen once a submission starts
    pub fn set_email(&mut self, email: String) -> Result<(), SubmitError> {
        self.ensure_open()?;
        self.email = email;
        Ok(())
    }

    /// Enter Submitting, returning the address to send
    pub fn begin(&mut self) -> Result<String, SubmitError> {
        self.ensure_open()?;

        let email = self.email.trim();
        if email.is_empty() {
            return Err(SubmitError::EmptyEmail);
        }

        let email = email.to_string();
        self.transition_to(Phase::Submitting);
        self.error_message = None;
        Ok(email)
    }

    /// Submitting -> Succeeded
    pub fn succeed(&mut self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.transition_to(Phase::Succeeded);
        true
    }

    /// Submitting -> Failed with an inline message
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.transition_to(Phase::Failed);
        self.error_message = Some(message.into());
        true
    }

    fn is_submitting(&self) -> bool {
        if self.phase != Phase::Submitting {
            warn!(phase = %self.phase, "completion outside Submitting ignored");
            return false;
        }
        true
    }

    fn ensure_open(&self) -> Result<(), SubmitError> {
        match self.phase {
            Phase::Idle | Phase::Failed => Ok(()),
            Phase::Submitting => Err(SubmitError::InFlight),
            Phase::Succeeded => Err(SubmitError::AlreadySubscribed),
        }
    }

    fn transition_to(&mut self, new_phase: Phase) {
        debug!(from = %self.phase, to = %new_phase, "phase transition");
        self.phase = new_phase;
    }
}
