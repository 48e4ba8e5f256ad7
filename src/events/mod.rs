//! Events module for submission lifecycle transitions
//!
//! Provides structured event types emitted whenever the subscription
//! phase changes, for the page renderer and logging.

use serde::{Deserialize, Serialize};

/// Events emitted by the submission controller during transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionEvent {
    /// Entered Submitting; the request is in flight
    SubmitStarted {
        /// Address being submitted
        email: String,
    },

    /// Request accepted (2xx)
    Subscribed {
        /// Contact id assigned by the audience provider, if reported
        id: Option<String>,
        /// Server confirmation message
        message: String,
        /// Time spent in Submitting
        duration_ms: u64,
    },

    /// Request rejected or unreachable
    SubmitFailed {
        /// Message shown inline to the user
        message: String,
        /// Time spent in Submitting
        duration_ms: u64,
    },
}

impl std::fmt::Display for SubscriptionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionEvent::SubmitStarted { .. } => write!(f, "SUBMIT_STARTED"),
            SubscriptionEvent::Subscribed { duration_ms, .. } => {
                write!(f, "SUBSCRIBED ({}ms)", duration_ms)
            }
            SubscriptionEvent::SubmitFailed { message, duration_ms } => {
                write!(f, "SUBMIT_FAILED ({}ms): {}", duration_ms, message)
            }
        }
    }
}
