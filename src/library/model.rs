use std::path::PathBuf;
use std::time::Duration;

use crate::descriptor;

/// Shown when a file carries no artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// An audio file found in the local music folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub duration: Option<Duration>,
}

impl Track {
    /// `"<title> by <artist>"`, falling back to [`UNKNOWN_ARTIST`].
    pub fn descriptor(&self) -> String {
        let artist = self.artist.as_deref().unwrap_or(UNKNOWN_ARTIST);
        descriptor::format(&self.title, &[artist])
    }
}
