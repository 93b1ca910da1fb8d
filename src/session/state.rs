use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::audio::{EngineError, MediaSource};
use crate::command::ParseError;
use crate::config::{LibrarySettings, Settings};
use crate::library::Track;
use crate::resolver::{ResolveError, SearchPurpose};
use crate::store::StoreError;

/// Everything that can go wrong while handling input, as shown on the status line.
#[derive(Error, Debug)]
pub enum Failure {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The command is valid but makes no sense right now.
    #[error("{0}")]
    Usage(String),
}

impl Failure {
    pub(super) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

/// Settings the session needs, pulled out of [`Settings`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub query_suffix: String,
    pub skip_seconds: u64,
    pub default_volume: u8,
    pub music_dir: Option<PathBuf>,
    pub library: LibrarySettings,
}

impl SessionConfig {
    /// `music_dir` overrides `library.music_dir` (the optional CLI argument).
    pub fn from_settings(settings: &Settings, music_dir: Option<PathBuf>) -> Self {
        Self {
            query_suffix: settings.resolver.query_suffix.clone(),
            skip_seconds: settings.controls.skip_seconds,
            default_volume: settings.audio.default_volume.min(100),
            music_dir: music_dir.or_else(|| settings.library.music_dir.clone()),
            library: settings.library.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), None)
    }
}

/// The track the engine was last asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub descriptor: String,
    pub duration: Option<Duration>,
    /// Resolver query, `None` for local files.
    pub query: Option<String>,
    pub source: MediaSource,
}

/// A resolve request whose answer has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loading {
    pub descriptor: String,
    pub query: String,
}

/// What a bare number typed at the prompt refers to.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    None,
    /// Descriptors from a search, recents or a playlist view.
    Tracks {
        purpose: SearchPurpose,
        items: Vec<String>,
    },
    /// The queue as shown by `/show-queue`.
    Queue,
    /// Playlist names offered by `/pt`.
    Playlists(Vec<String>),
    Library(Vec<Track>),
}

/// The main dashboard panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub lines: Vec<String>,
}

impl View {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

/// Last message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}
