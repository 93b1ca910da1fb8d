use std::time::Duration;

use thiserror::Error;

use super::types::{EngineState, MediaSource};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("audio thread is not running")]
    Disconnected,
    #[error("could not load audio: {0}")]
    Load(String),
}

/// Imperative playback surface the session drives.
///
/// `play` returns as soon as the request is accepted; loading happens in the
/// background and is observed through [`PlaybackEngine::state`], which reports
/// `Opening` until the source starts or fails.
pub trait PlaybackEngine {
    fn play(&mut self, source: MediaSource) -> Result<(), EngineError>;
    fn pause(&mut self) -> Result<(), EngineError>;
    fn resume(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self) -> Result<(), EngineError>;

    /// Set the volume (0-100). Values above 100 are clamped.
    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError>;
    fn volume(&self) -> u8;

    /// Current position in the playing source.
    fn time(&self) -> Duration;
    fn set_time(&mut self, position: Duration) -> Result<(), EngineError>;

    fn state(&self) -> EngineState;

    /// Length of the current source, if the decoder knows it.
    fn duration(&self) -> Option<Duration>;

    /// Message describing the most recent `Error` state.
    fn last_error(&self) -> Option<String>;
}
