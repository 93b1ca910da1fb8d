//! File-backed user data: the recents list and named playlists.
//!
//! Everything lives under one `userfiles` directory:
//!
//! ```text
//! userfiles/recents.txt              one descriptor per line, newest first
//! userfiles/playlists/<name>.json    [{"name": ..., "artist": ...}, ...]
//! ```
//!
//! Files are read in full and rewritten in full on every change.

mod error;
mod playlists;
mod recents;

use std::path::{Path, PathBuf};

pub use error::StoreError;
pub use playlists::PlaylistEntry;
pub use recents::{RECENTS_CAP, push_recent};

/// Handle to the on-disk user files.
#[derive(Debug, Clone)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    /// Create a store rooted at `root` (the `userfiles` directory).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recents_path(&self) -> PathBuf {
        self.root.join("recents.txt")
    }

    pub fn playlists_dir(&self) -> PathBuf {
        self.root.join("playlists")
    }
}

#[cfg(test)]
mod tests;
