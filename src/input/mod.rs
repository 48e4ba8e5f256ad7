//! Input module for terminal interaction events
//!
//! Reads commands from stdin on a dedicated thread and turns them into
//! the pointer, focus and form events the page reacts to.

mod command;
mod listener;

pub use command::{InputError, UiEvent};
pub use listener::{InputEvent, InputListener};
