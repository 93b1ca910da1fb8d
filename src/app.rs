//! Application module: the prompt model used by the TUI and runtime.
//!
//! `App` holds what the user is typing and the history of submitted lines;
//! everything else on screen is read from the session.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
