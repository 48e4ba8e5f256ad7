//! Subscription state module
//!
//! Provides the signup form's lifecycle with four phases:
//! - Idle: nothing submitted yet
//! - Submitting: one request in flight, further submits refused
//! - Succeeded: terminal, confirmation cue played
//! - Failed: inline error shown, user may submit again

mod controller;
mod machine;

pub use controller::SubmissionController;
pub use machine::{Phase, SubmitError};
