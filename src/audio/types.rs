//! Audio-related small types and handles.
//!
//! This module defines the commands sent to the audio thread, the engine
//! state machine and the playback info the thread publishes back.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Where the engine reads audio from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A remote stream (HTTP(S) URL from the resolver).
    Url(String),
    /// A file from the local library.
    File(PathBuf),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Nothing has been played yet.
    #[default]
    Idle,
    /// A source is being fetched or decoded.
    Opening,
    Playing,
    Paused,
    /// The current source played to its end.
    Ended,
    /// Playback was stopped by request.
    Stopped,
    /// The last source could not be loaded or decoded.
    Error,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Load `source` and start playing it at `volume` (0.0-1.0).
    ///
    /// `generation` matches [`PlaybackInfo::generation`] as set for this request.
    Play {
        source: MediaSource,
        volume: f32,
        generation: u64,
    },
    Pause,
    Resume,
    /// Stop playback immediately.
    Stop,
    /// Set the linear sink volume (0.0-1.0).
    SetVolume(f32),
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the session.
pub struct PlaybackInfo {
    pub state: EngineState,
    /// Position inside the current source.
    pub position: Duration,
    /// Total length reported by the decoder, when known.
    pub duration: Option<Duration>,
    /// Why the last load failed.
    pub error: Option<String>,
    /// Bumped by every play request. Load results for older ones are dropped.
    pub generation: u64,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
