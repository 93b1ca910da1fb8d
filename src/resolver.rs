//! Track search and stream resolution.
//!
//! A [`Backend`] answers four questions: which catalog tracks match a query,
//! which tracks are similar to the one playing, which tracks make up an album,
//! and which playable URL belongs to a descriptor. The production backend
//! ([`StreamingBackend`]) asks the Spotify Web API for metadata and `yt-dlp`
//! for stream URLs; it runs on a [`ResolverWorker`] thread so the UI never
//! waits on the network.

mod cache;
mod catalog;
mod stream;
mod types;
mod worker;

pub use cache::ResolveCache;
pub use catalog::SpotifyCatalog;
pub use stream::YtDlp;
pub use types::{Backend, Request, ResolveError, ResolvedStream, Response, SearchPurpose, execute};
pub use worker::{ResolverWorker, StreamingBackend};
