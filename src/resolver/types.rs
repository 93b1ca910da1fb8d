use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::LibrarySettings;
use crate::library::{self, Track};

/// A playable stream for a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub url: String,
    pub duration: Option<Duration>,
    pub title: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no results for {0:?}")]
    NotFound(String),
    /// The service or tool cannot be reached at all (missing binary, no credentials).
    #[error("{0}")]
    Unavailable(String),
    #[error("authorization failed: {0}")]
    Auth(String),
    /// Network hiccups, timeouts, non-zero exits: worth retrying later.
    #[error("request failed: {0}")]
    Transient(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(s) if s == reqwest::StatusCode::UNAUTHORIZED || s == reqwest::StatusCode::FORBIDDEN => {
                Self::Auth(e.to_string())
            }
            _ if e.is_decode() => Self::Decode(e.to_string()),
            _ => Self::Transient(e.to_string()),
        }
    }
}

/// Search, suggestion and resolution service.
///
/// Implementations block; callers run them off the UI thread.
pub trait Backend: Send {
    /// Up to N descriptors matching `query`, numbered `"1. name by artist"`.
    fn search(&mut self, query: &str) -> Result<Vec<String>, ResolveError>;

    /// Descriptors by the same artist as `descriptor`.
    fn similar(&mut self, descriptor: &str) -> Result<Vec<String>, ResolveError>;

    /// Descriptors of the best-matching album's tracks, in album order.
    fn album(&mut self, query: &str) -> Result<Vec<String>, ResolveError>;

    /// A playable stream URL for a free-text query.
    fn resolve(&mut self, query: &str) -> Result<ResolvedStream, ResolveError>;

    /// Drop anything cached for `query`.
    fn forget(&mut self, _query: &str) {}
}

/// What a search result list will be used for once the user picks an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPurpose {
    Play,
    Queue,
    Playlist(String),
}

/// Work handed to the resolver worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search { query: String, purpose: SearchPurpose },
    Similar { descriptor: String },
    Album { query: String },
    Resolve { descriptor: String, query: String },
    Forget { query: String },
    /// Walk the local music folder. Runs here to keep the UI thread responsive.
    ScanLibrary {
        dir: PathBuf,
        settings: LibrarySettings,
    },
}

impl Request {
    /// The response the session would get had `backend` failed with `error`.
    ///
    /// Used when the worker is gone, so whatever waits on the answer is released.
    pub fn failed(self, error: ResolveError) -> Option<Response> {
        match self {
            Request::Search { query, purpose } => Some(Response::Search {
                query,
                purpose,
                result: Err(error),
            }),
            Request::Similar { descriptor } => Some(Response::Similar {
                descriptor,
                result: Err(error),
            }),
            Request::Album { query } => Some(Response::Album {
                query,
                result: Err(error),
            }),
            Request::Resolve { descriptor, query } => Some(Response::Resolved {
                descriptor,
                query,
                result: Err(error),
            }),
            Request::ScanLibrary { dir, .. } => Some(Response::Library {
                dir,
                result: Err(error),
            }),
            Request::Forget { .. } => None,
        }
    }
}

/// Results coming back from the resolver worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Search {
        query: String,
        purpose: SearchPurpose,
        result: Result<Vec<String>, ResolveError>,
    },
    Similar {
        descriptor: String,
        result: Result<Vec<String>, ResolveError>,
    },
    Album {
        query: String,
        result: Result<Vec<String>, ResolveError>,
    },
    Resolved {
        descriptor: String,
        query: String,
        result: Result<ResolvedStream, ResolveError>,
    },
    Library {
        dir: PathBuf,
        result: Result<Vec<Track>, ResolveError>,
    },
}

/// Run one request against `backend`. `Forget` has no response.
///
/// Library scans don't touch the backend; they share the worker thread.
pub fn execute(backend: &mut dyn Backend, request: Request) -> Option<Response> {
    match request {
        Request::Search { query, purpose } => {
            let result = backend.search(&query);
            Some(Response::Search {
                query,
                purpose,
                result,
            })
        }
        Request::Similar { descriptor } => {
            let result = backend.similar(&descriptor);
            Some(Response::Similar { descriptor, result })
        }
        Request::Album { query } => {
            let result = backend.album(&query);
            Some(Response::Album { query, result })
        }
        Request::Resolve { descriptor, query } => {
            let result = backend.resolve(&query);
            Some(Response::Resolved {
                descriptor,
                query,
                result,
            })
        }
        Request::Forget { query } => {
            backend.forget(&query);
            None
        }
        Request::ScanLibrary { dir, settings } => {
            let tracks = library::scan(&dir, &settings);
            Some(Response::Library {
                dir,
                result: Ok(tracks),
            })
        }
    }
}
