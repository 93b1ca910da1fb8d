use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::cache::ResolveCache;
use super::catalog::SpotifyCatalog;
use super::stream::YtDlp;
use super::types::{Backend, Request, ResolveError, ResolvedStream, Response, execute};
use crate::config::{CatalogSettings, ResolverSettings};

/// Spotify for metadata, `yt-dlp` for audio, with a TTL cache in front of
/// stream resolution.
pub struct StreamingBackend {
    catalog: Result<SpotifyCatalog, ResolveError>,
    stream: YtDlp,
    cache: ResolveCache,
}

impl StreamingBackend {
    pub fn new(catalog: CatalogSettings, resolver: &ResolverSettings) -> Self {
        Self {
            catalog: SpotifyCatalog::new(catalog),
            stream: YtDlp::new(
                resolver.program.clone(),
                Duration::from_secs(resolver.timeout_secs),
            ),
            cache: ResolveCache::new(Duration::from_secs(resolver.cache_ttl_secs)),
        }
    }

    fn catalog(&mut self) -> Result<&mut SpotifyCatalog, ResolveError> {
        self.catalog.as_mut().map_err(|e| e.clone())
    }
}

impl Backend for StreamingBackend {
    fn search(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        self.catalog()?.search(query)
    }

    fn similar(&mut self, descriptor: &str) -> Result<Vec<String>, ResolveError> {
        self.catalog()?.similar(descriptor)
    }

    fn album(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        self.catalog()?.album(query)
    }

    fn resolve(&mut self, query: &str) -> Result<ResolvedStream, ResolveError> {
        let now = Instant::now();
        if let Some(hit) = self.cache.get(query, now) {
            debug!(%query, "stream cache hit");
            return Ok(hit);
        }
        self.cache.prune(now);

        let stream = self.stream.resolve(query)?;
        self.cache.insert(query, stream.clone(), Instant::now());
        debug!(%query, cached = self.cache.len(), "stream resolved");
        Ok(stream)
    }

    fn forget(&mut self, query: &str) {
        self.cache.forget(query);
    }
}

/// Runs a [`Backend`] on its own thread.
///
/// Requests are handled one at a time in arrival order; responses are picked up
/// with [`ResolverWorker::try_recv`] from the event loop.
pub struct ResolverWorker {
    tx: Option<Sender<Request>>,
    rx: Receiver<Response>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ResolverWorker {
    pub fn spawn(mut backend: Box<dyn Backend>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<Request>();
        let (resp_tx, resp_rx) = mpsc::channel::<Response>();

        let handle = thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                debug!(?request, "resolver request");
                if let Some(response) = execute(backend.as_mut(), request) {
                    if resp_tx.send(response).is_err() {
                        break;
                    }
                }
            }
            info!("resolver worker stopped");
        });

        Self {
            tx: Some(req_tx),
            rx: resp_rx,
            join: Mutex::new(Some(handle)),
        }
    }

    /// Queue a request. Hands it back when the worker thread is gone.
    pub fn send(&self, request: Request) -> Result<(), Request> {
        let Some(tx) = &self.tx else {
            return Err(request);
        };
        tx.send(request).map_err(|e| {
            warn!("resolver worker is gone; request dropped");
            e.0
        })
    }

    /// Next finished response, if any.
    pub fn try_recv(&self) -> Option<Response> {
        match self.rx.try_recv() {
            Ok(r) => Some(r),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stop accepting work. An in-flight request is abandoned, not awaited.
    pub fn shutdown(&mut self) {
        self.tx = None;
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                if h.is_finished() {
                    let _ = h.join();
                }
            }
        }
    }
}

impl Drop for ResolverWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
