use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Failure, Loading, NowPlaying, Session};
use crate::audio::{EngineError, EngineState, MediaSource, PlaybackEngine};
use crate::descriptor;
use crate::library::Track;
use crate::resolver::{Request, ResolveError, ResolvedStream};
use crate::store::{RECENTS_CAP, push_recent};

impl<E: PlaybackEngine> Session<E> {
    /// Resolve `descriptor` to a stream and play it once the answer arrives.
    ///
    /// Any ordinal prefix is stripped first. Autofill is left as it is, so this
    /// is also the auto-advance path.
    pub fn play(&mut self, descriptor: &str) -> Result<(), Failure> {
        let descriptor = descriptor::clean(descriptor).trim();
        if descriptor.is_empty() {
            return Err(Failure::usage("Nothing to play"));
        }

        let query = format!("{descriptor}{}", self.config.query_suffix);
        info!(%descriptor, %query, "resolving");
        self.say(format!("Loading {descriptor}..."));
        self.loading = Some(Loading {
            descriptor: descriptor.to_string(),
            query: query.clone(),
        });
        self.request(Request::Resolve {
            descriptor: descriptor.to_string(),
            query,
        });
        Ok(())
    }

    /// Play something the user picked explicitly; turns autofill back on.
    pub(super) fn play_user(&mut self, descriptor: &str) -> Result<(), Failure> {
        self.autofill = true;
        self.play(descriptor)
    }

    /// Play a file from the local library, bypassing the resolver.
    pub(super) fn play_local(&mut self, track: &Track) -> Result<(), Failure> {
        self.autofill = true;
        self.loading = None;
        self.start(NowPlaying {
            descriptor: track.descriptor(),
            duration: track.duration,
            query: None,
            source: MediaSource::File(track.path.clone()),
        })
    }

    pub(super) fn on_resolved(
        &mut self,
        descriptor: String,
        query: String,
        result: Result<ResolvedStream, ResolveError>,
    ) {
        if self.loading.as_ref().map(|l| l.descriptor.as_str()) != Some(descriptor.as_str()) {
            debug!(%descriptor, "discarding stale resolve");
            return;
        }
        self.loading = None;

        let outcome = result.map_err(Failure::from).and_then(|stream| {
            self.start(NowPlaying {
                descriptor,
                duration: stream.duration,
                query: Some(query),
                source: MediaSource::Url(stream.url),
            })
        });
        if let Err(f) = outcome {
            self.fail(f);
        }
    }

    fn start(&mut self, now: NowPlaying) -> Result<(), Failure> {
        self.engine.play(now.source.clone())?;
        self.engine.set_volume(self.volume)?;

        info!(descriptor = %now.descriptor, duration = ?now.duration, "now playing");
        self.elapsed = Duration::ZERO;
        self.accent = rand::random();
        self.say(format!("Now playing {}", now.descriptor));

        let descriptor = now.descriptor.clone();
        self.current = Some(now);

        match self.store.add_recent(&descriptor) {
            Ok(list) => self.recents = list,
            Err(e) => {
                push_recent(&mut self.recents, &descriptor, RECENTS_CAP);
                self.fail(e.into());
            }
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), Failure> {
        if self.current.is_none() {
            return Err(Failure::usage("Nothing is playing"));
        }
        if self.engine.state() == EngineState::Playing {
            self.engine.pause()?;
            self.say("Paused");
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), Failure> {
        if self.current.is_none() {
            return Err(Failure::usage("Nothing is playing"));
        }
        if self.engine.state() == EngineState::Paused {
            self.engine.resume()?;
            self.say("Resumed");
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), Failure> {
        self.loading = None;
        self.elapsed = Duration::ZERO;
        if self.current.take().is_some() {
            self.say("Stopped");
        }
        self.engine.stop()?;
        Ok(())
    }

    /// Clamp `volume` to 0-100 and apply it.
    pub fn set_volume(&mut self, volume: i64) -> Result<(), Failure> {
        let volume = volume.clamp(0, 100) as u8;
        self.volume = volume;
        self.engine.set_volume(volume)?;
        self.say(format!("Volume {volume}"));
        Ok(())
    }

    /// Move the position forward, stopping at the end of the track when its
    /// length is known.
    pub fn skip_forward(&mut self, seconds: u64) -> Result<(), Failure> {
        let Some(now) = &self.current else {
            return Err(Failure::usage("Nothing is playing"));
        };
        let target = self.engine.time().saturating_add(Duration::from_secs(seconds));
        let target = match now.duration.or_else(|| self.engine.duration()) {
            Some(d) => target.min(d),
            None => target,
        };
        self.seek(target)
    }

    pub fn skip_backward(&mut self, seconds: u64) -> Result<(), Failure> {
        if self.current.is_none() {
            return Err(Failure::usage("Nothing is playing"));
        }
        let target = self.engine.time().saturating_sub(Duration::from_secs(seconds));
        self.seek(target)
    }

    fn seek(&mut self, target: Duration) -> Result<(), Failure> {
        self.engine.set_time(target)?;
        self.elapsed = target;
        Ok(())
    }

    pub fn enqueue(&mut self, descriptor: &str) {
        let descriptor = descriptor::clean(descriptor).trim();
        if descriptor.is_empty() {
            return;
        }
        self.queue.push_back(descriptor.to_string());
        self.say(format!(
            "Queued {descriptor} (position {})",
            self.queue.len()
        ));
    }

    /// Remove the `position`-th (1-based) queued track and play it.
    pub fn play_from_queue(&mut self, position: usize) -> Result<(), Failure> {
        let descriptor = position
            .checked_sub(1)
            .and_then(|i| self.queue.remove(i))
            .ok_or_else(|| Failure::usage(format!("No track at position {position} in the queue")))?;
        self.play_user(&descriptor)
    }

    pub fn next(&mut self) -> Result<(), Failure> {
        let descriptor = self
            .queue
            .pop_front()
            .ok_or_else(|| Failure::usage("The queue is empty"))?;
        self.play_user(&descriptor)
    }

    /// Go back to the most recent track that is not the current one. The
    /// current track goes to the front of the queue.
    pub fn prev(&mut self) -> Result<(), Failure> {
        let current = self.current.as_ref().map(|c| c.descriptor.clone());
        let target = self
            .recents
            .iter()
            .find(|d| Some(d.as_str()) != current.as_deref())
            .cloned()
            .ok_or_else(|| Failure::usage("No previous track"))?;

        if let Some(c) = current {
            self.queue.push_front(c);
        }
        self.play_user(&target)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.autofill = false;
        self.say("Queue cleared. Autofill is off until you play something");
    }

    /// One playback tick: refresh progress, advance the queue when a track
    /// ends or fails, and top the queue up with similar tracks.
    pub fn poll(&mut self) {
        let state = self.engine.state();

        if let Some(now) = self.current.as_mut() {
            self.elapsed = self.engine.time();
            if now.duration.is_none() {
                now.duration = self.engine.duration();
            }
        }

        match state {
            EngineState::Error => {
                let Some(now) = self.current.take() else {
                    self.advance();
                    return;
                };
                let reason = self
                    .engine
                    .last_error()
                    .unwrap_or_else(|| "playback failed".to_string());
                if let Some(query) = now.query {
                    self.request(Request::Forget { query });
                }
                self.elapsed = Duration::ZERO;
                self.advance();
                // After advancing, so "Loading ..." does not hide the error.
                self.fail(EngineError::Load(reason).into());
            }
            EngineState::Ended => self.advance(),
            EngineState::Playing => self.suggest(),
            _ => {}
        }
    }

    fn advance(&mut self) {
        if self.loading.is_some() {
            return;
        }
        if let Some(next) = self.queue.pop_front() {
            debug!(%next, "advancing queue");
            if let Err(f) = self.play(&next) {
                self.fail(f);
            }
        }
    }

    fn suggest(&mut self) {
        if !self.autofill
            || self.suggest_in_flight
            || self.loading.is_some()
            || !self.queue.is_empty()
        {
            return;
        }
        let Some(now) = &self.current else {
            return;
        };
        let descriptor = now.descriptor.clone();
        self.suggest_in_flight = true;
        self.request(Request::Similar { descriptor });
    }

    pub(super) fn on_similar(
        &mut self,
        descriptor: String,
        result: Result<Vec<String>, ResolveError>,
    ) {
        self.suggest_in_flight = false;
        if self.current.as_ref().map(|c| c.descriptor.as_str()) != Some(descriptor.as_str()) {
            debug!(%descriptor, "discarding suggestions for a previous track");
            return;
        }

        match result {
            Ok(similar) => {
                let name = descriptor::split(&descriptor)
                    .map_or(descriptor.as_str(), |(name, _)| name)
                    .to_lowercase();
                let before = self.queue.len();
                for d in similar {
                    let d = descriptor::clean(&d).trim().to_string();
                    if d.is_empty() || d.to_lowercase().contains(&name) || self.queue.contains(&d) {
                        continue;
                    }
                    self.queue.push_back(d);
                }
                info!(added = self.queue.len() - before, "autofilled queue");
            }
            Err(e @ (ResolveError::Unavailable(_) | ResolveError::Auth(_))) => {
                warn!(error = %e, "suggestions unavailable, autofill off");
                self.autofill = false;
            }
            Err(e) => debug!(error = %e, "no suggestions this tick"),
        }
    }
}
