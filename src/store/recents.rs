use std::fs;
use std::io::ErrorKind;

use super::{StoreError, UserStore};

/// Maximum number of entries kept in the recents list.
pub const RECENTS_CAP: usize = 10;

/// Move `descriptor` to the front of `list`, dropping duplicates and
/// truncating to `cap` entries.
pub fn push_recent(list: &mut Vec<String>, descriptor: &str, cap: usize) {
    list.retain(|d| d != descriptor);
    list.insert(0, descriptor.to_string());
    list.truncate(cap);
}

impl UserStore {
    /// Read the recents list, newest first. A missing file is an empty list.
    pub fn recents(&self) -> Result<Vec<String>, StoreError> {
        let path = self.recents_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Record `descriptor` as the most recently played track and return the
    /// updated list.
    pub fn add_recent(&self, descriptor: &str) -> Result<Vec<String>, StoreError> {
        let mut list = self.recents()?;
        push_recent(&mut list, descriptor, RECENTS_CAP);

        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let path = self.recents_path();
        let mut text = list.join("\n");
        text.push('\n');
        fs::write(&path, text).map_err(|e| StoreError::io(path, e))?;

        Ok(list)
    }
}
