use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::{StoreError, UserStore};
use crate::descriptor;

/// One track stored in a playlist file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub name: String,
    pub artist: String,
}

impl PlaylistEntry {
    /// Parse a (possibly numbered) descriptor into an entry.
    pub fn from_descriptor(text: &str) -> Result<Self, StoreError> {
        let (name, artist) =
            descriptor::split(text).ok_or_else(|| StoreError::BadDescriptor(text.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            artist: artist.to_string(),
        })
    }

    pub fn descriptor(&self) -> String {
        descriptor::format(&self.name, &[self.artist.as_str()])
    }
}

fn validate_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(|c| matches!(c, '/' | '\\' | '\0'))
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

impl UserStore {
    fn playlist_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let name = validate_name(name)?;
        Ok(self.playlists_dir().join(format!("{name}.json")))
    }

    /// Names of all saved playlists, sorted.
    pub fn playlists(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.playlists_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                StoreError::io(&dir, source)
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names)
    }

    /// All entries of playlist `name`. A missing playlist is empty.
    pub fn playlist(&self, name: &str) -> Result<Vec<PlaylistEntry>, StoreError> {
        let path = self.playlist_path(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Json { path, source })
    }

    /// Insert `descriptor` at the front of playlist `name`, creating it if
    /// needed. Returns the new playlist length.
    pub fn add_to_playlist(&self, name: &str, descriptor: &str) -> Result<usize, StoreError> {
        let entry = PlaylistEntry::from_descriptor(descriptor)?;
        let mut entries = self.playlist(name)?;
        entries.insert(0, entry);

        let dir = self.playlists_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let path = self.playlist_path(name)?;
        let json = serde_json::to_string_pretty(&entries).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| StoreError::io(path, e))?;

        Ok(entries.len())
    }
}
