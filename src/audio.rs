//! Playback engine.
//!
//! The session talks to a [`PlaybackEngine`]; [`AudioPlayer`] implements it
//! with rodio on a dedicated thread fed by [`AudioCmd`](types::AudioCmd)s.

mod engine;
mod player;
mod sink;
mod thread;
mod types;

pub use engine::{EngineError, PlaybackEngine};
pub use player::AudioPlayer;
pub use types::{EngineState, MediaSource};
