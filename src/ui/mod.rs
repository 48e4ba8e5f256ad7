//! UI composition layer

mod page;

pub use page::{Flow, LandingPage};
