use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing user files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed playlist {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid playlist name {0:?}")]
    InvalidName(String),

    #[error("expected \"<track> by <artist>\", got {0:?}")]
    BadDescriptor(String),
}

impl StoreError {
    pub(super) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
