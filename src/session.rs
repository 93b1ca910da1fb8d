//! The session coordinator.
//!
//! [`Session`] owns the current track, the play queue, recents and whatever
//! list the user is picking from. It is driven from one thread: prompt input
//! goes through [`Session::handle_line`], resolver answers through
//! [`Session::on_response`] and the playback tick through [`Session::poll`].
//! Work for the resolver is collected in an outbox drained with
//! [`Session::take_requests`].

mod browse;
mod playback;
mod state;

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{info, warn};

use crate::app::PlaybackState;
use crate::audio::PlaybackEngine;
use crate::command::{self, Command, Input};
use crate::resolver::{Request, Response, SearchPurpose};
use crate::store::UserStore;

pub use state::{Failure, Loading, NowPlaying, Selection, SessionConfig, Status, View};

pub struct Session<E: PlaybackEngine> {
    engine: E,
    store: UserStore,
    config: SessionConfig,

    current: Option<NowPlaying>,
    loading: Option<Loading>,
    queue: VecDeque<String>,
    recents: Vec<String>,
    volume: u8,
    elapsed: Duration,
    accent: u8,

    /// Append similar tracks when the queue runs dry.
    autofill: bool,
    suggest_in_flight: bool,

    selection: Selection,
    view: View,
    status: Option<Status>,

    requests: Vec<Request>,
    quit: bool,
}

impl<E: PlaybackEngine> Session<E> {
    pub fn new(mut engine: E, store: UserStore, config: SessionConfig) -> Self {
        let volume = config.default_volume.min(100);
        if let Err(e) = engine.set_volume(volume) {
            warn!(error = %e, "could not apply startup volume");
        }

        let mut session = Self {
            engine,
            store,
            config,
            current: None,
            loading: None,
            queue: VecDeque::new(),
            recents: Vec::new(),
            volume,
            elapsed: Duration::ZERO,
            accent: 0,
            autofill: true,
            suggest_in_flight: false,
            selection: Selection::None,
            view: View::new("Help", browse::help_lines()),
            status: None,
            requests: Vec::new(),
            quit: false,
        };

        match session.store.recents() {
            Ok(r) => session.recents = r,
            Err(e) => session.fail(e.into()),
        }
        session
    }

    // Read-only view for the presenter and MPRIS.

    pub fn current(&self) -> Option<&NowPlaying> {
        self.current.as_ref()
    }

    pub fn loading(&self) -> Option<&Loading> {
        self.loading.as_ref()
    }

    pub fn queue(&self) -> &VecDeque<String> {
        &self.queue
    }

    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn accent(&self) -> u8 {
        self.accent
    }

    pub fn autofill(&self) -> bool {
        self.autofill
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.current.is_none() {
            return PlaybackState::Stopped;
        }
        self.engine.state().into()
    }

    /// Requests queued for the resolver since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    fn request(&mut self, request: Request) {
        self.requests.push(request);
    }

    fn say(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn fail(&mut self, failure: Failure) {
        warn!(error = %failure, "command failed");
        self.status = Some(Status {
            text: failure.to_string(),
            is_error: true,
        });
    }

    fn show(&mut self, view: View, selection: Selection) {
        self.view = view;
        self.selection = selection;
    }

    /// Parse and run one prompt line.
    pub fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match command::parse(line) {
            Ok(input) => self.handle(input),
            Err(e) => self.fail(e.into()),
        }
    }

    pub fn handle(&mut self, input: Input) {
        let result = match input {
            Input::Select(n) => self.select(n),
            Input::Text(_) => Err(Failure::usage(
                "Type a command, e.g. /play <track name>. /help lists them all",
            )),
            Input::Command(cmd) => self.run(cmd),
        };
        if let Err(f) = result {
            self.fail(f);
        }
    }

    fn run(&mut self, cmd: Command) -> Result<(), Failure> {
        match cmd {
            Command::Play(query) => self.search(query, SearchPurpose::Play),
            Command::QueueAdd(query) => self.search(query, SearchPurpose::Queue),
            Command::AddToPlaylist { playlist, query } => {
                self.search(query, SearchPurpose::Playlist(playlist))
            }
            Command::Volume(v) => self.set_volume(v),
            Command::QueuePlay(n) => self.play_from_queue(n),
            Command::SkipForward(s) => self.skip_forward(s.unwrap_or(self.config.skip_seconds)),
            Command::SkipBackward(s) => self.skip_backward(s.unwrap_or(self.config.skip_seconds)),
            Command::ViewPlaylist(name) => self.view_playlist(&name),
            Command::Album(query) => {
                self.say(format!("Looking up album {query:?}..."));
                self.request(Request::Album { query });
                Ok(())
            }
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
            Command::ShowQueue => {
                self.show_queue();
                Ok(())
            }
            Command::ClearQueue => {
                self.clear_queue();
                Ok(())
            }
            Command::Next => self.next(),
            Command::Prev => self.prev(),
            Command::Recents => {
                self.show_recents();
                Ok(())
            }
            Command::ShowPlaylists => self.show_playlists(false),
            Command::PlayPlaylist => self.show_playlists(true),
            Command::Library => self.show_library(),
            Command::Help => {
                self.show(View::new("Help", browse::help_lines()), Selection::None);
                Ok(())
            }
            Command::Quit => {
                info!("quit requested");
                self.quit = true;
                Ok(())
            }
        }
    }

    fn search(&mut self, query: String, purpose: SearchPurpose) -> Result<(), Failure> {
        self.say(format!("Searching for {query:?}..."));
        self.request(Request::Search { query, purpose });
        Ok(())
    }

    /// Apply a resolver answer.
    pub fn on_response(&mut self, response: Response) {
        match response {
            Response::Resolved {
                descriptor,
                query,
                result,
            } => self.on_resolved(descriptor, query, result),
            Response::Search {
                query,
                purpose,
                result,
            } => match result {
                Ok(items) => self.show_results(&query, purpose, items),
                Err(e) => self.fail(e.into()),
            },
            Response::Similar { descriptor, result } => self.on_similar(descriptor, result),
            Response::Album { query, result } => {
                let outcome = result
                    .map_err(Failure::from)
                    .and_then(|tracks| self.play_list(&format!("album {query:?}"), tracks));
                if let Err(f) = outcome {
                    self.fail(f);
                }
            }
            Response::Library { dir, result } => {
                let outcome = result
                    .map_err(Failure::from)
                    .and_then(|tracks| self.on_library(dir, tracks));
                if let Err(f) = outcome {
                    self.fail(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
