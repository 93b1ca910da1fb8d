//! Time-bounded cache of resolved stream URLs.
//!
//! Extracted URLs expire upstream, so entries are only reused for `ttl` and
//! can be dropped early when playback of a cached URL fails.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::types::ResolvedStream;

#[derive(Debug)]
pub struct ResolveCache {
    ttl: Duration,
    entries: HashMap<String, (ResolvedStream, Instant)>,
}

impl ResolveCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The cached stream for `query` if it was stored less than `ttl` before `now`.
    pub fn get(&mut self, query: &str, now: Instant) -> Option<ResolvedStream> {
        let fresh = match self.entries.get(query) {
            Some((_, stored)) => now.saturating_duration_since(*stored) < self.ttl,
            None => return None,
        };
        if fresh {
            self.entries.get(query).map(|(s, _)| s.clone())
        } else {
            self.entries.remove(query);
            None
        }
    }

    pub fn insert(&mut self, query: &str, stream: ResolvedStream, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(query.to_string(), (stream, now));
    }

    pub fn forget(&mut self, query: &str) {
        self.entries.remove(query);
    }

    /// Drop every expired entry.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, stored)| now.saturating_duration_since(*stored) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
