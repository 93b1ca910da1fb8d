use std::path::PathBuf;

use tracing::info;

use super::{Failure, Selection, Session, View};
use crate::audio::PlaybackEngine;
use crate::command::HELP;
use crate::descriptor;
use crate::library::Track;
use crate::resolver::{Request, ResolveError, SearchPurpose};
use crate::store::StoreError;

pub(super) fn help_lines() -> Vec<String> {
    HELP.iter()
        .map(|(cmd, what)| format!("{cmd:<34} {what}"))
        .collect()
}

fn out_of_range(n: usize) -> Failure {
    Failure::usage(format!("There is no entry {n} in the list"))
}

impl<E: PlaybackEngine> Session<E> {
    /// Act on a bare number typed at the prompt.
    pub(super) fn select(&mut self, n: usize) -> Result<(), Failure> {
        let idx = n.checked_sub(1).ok_or_else(|| out_of_range(n))?;

        match &self.selection {
            Selection::None => Err(Failure::usage(
                "Nothing to pick from. Search with /play <track name> first",
            )),
            Selection::Tracks { purpose, items } => {
                let item = items.get(idx).cloned().ok_or_else(|| out_of_range(n))?;
                match purpose.clone() {
                    SearchPurpose::Play => self.play_user(&item),
                    SearchPurpose::Queue => {
                        self.enqueue(&item);
                        Ok(())
                    }
                    SearchPurpose::Playlist(name) => {
                        let track = descriptor::clean(&item).to_string();
                        let len = self.store.add_to_playlist(&name, &track)?;
                        info!(playlist = %name, %track, "added to playlist");
                        self.say(format!("Added {track} to {name} ({len} tracks)"));
                        Ok(())
                    }
                }
            }
            Selection::Queue => self.play_from_queue(n),
            Selection::Playlists(names) => {
                let name = names.get(idx).cloned().ok_or_else(|| out_of_range(n))?;
                let tracks = self
                    .store
                    .playlist(&name)?
                    .iter()
                    .map(|e| e.descriptor())
                    .collect();
                self.play_list(&format!("playlist {name}"), tracks)
            }
            Selection::Library(tracks) => {
                let track = tracks.get(idx).cloned().ok_or_else(|| out_of_range(n))?;
                self.play_local(&track)
            }
        }
    }

    pub(super) fn show_results(&mut self, query: &str, purpose: SearchPurpose, items: Vec<String>) {
        if items.is_empty() {
            self.fail(ResolveError::NotFound(query.to_string()).into());
            return;
        }
        let action = match &purpose {
            SearchPurpose::Play => "play".to_string(),
            SearchPurpose::Queue => "queue".to_string(),
            SearchPurpose::Playlist(name) => format!("add to {name}"),
        };
        self.say(format!("{} results for {query:?}", items.len()));
        self.show(
            View::new(
                format!("Results for {query:?}: type a number to {action}"),
                items.clone(),
            ),
            Selection::Tracks { purpose, items },
        );
    }

    /// Play the first of `tracks` and put the rest, in order, at the front of
    /// the queue.
    pub(super) fn play_list(&mut self, label: &str, tracks: Vec<String>) -> Result<(), Failure> {
        let mut tracks = tracks
            .iter()
            .map(|d| descriptor::clean(d).trim().to_string())
            .filter(|d| !d.is_empty());
        let first = tracks
            .next()
            .ok_or_else(|| Failure::usage(format!("{label} has no tracks")))?;
        let rest: Vec<String> = tracks.collect();

        for d in rest.iter().rev() {
            self.queue.push_front(d.clone());
        }
        self.play_user(&first)?;
        info!(%label, queued = rest.len(), "playing list");
        self.say(format!("Playing {label}, {} more queued", rest.len()));
        Ok(())
    }

    pub(super) fn show_queue(&mut self) {
        let title = match (self.queue.len(), self.autofill) {
            (0, true) => "Queue is empty; similar tracks are added while something plays".to_string(),
            (0, false) => "Queue is empty".to_string(),
            (n, _) => format!("Queue ({n}): type a number to play it now"),
        };
        let items: Vec<&str> = self.queue.iter().map(String::as_str).collect();
        let lines = descriptor::numbered(&items);
        self.show(View::new(title, lines), Selection::Queue);
    }

    pub(super) fn show_recents(&mut self) {
        let title = if self.recents.is_empty() {
            "Nothing played yet".to_string()
        } else {
            "Recently played: type a number to play".to_string()
        };
        let lines = descriptor::numbered(&self.recents);
        let items = self.recents.clone();
        self.show(
            View::new(title, lines),
            Selection::Tracks {
                purpose: SearchPurpose::Play,
                items,
            },
        );
    }

    /// List playlists; with `to_play`, a number then plays the chosen one.
    pub(super) fn show_playlists(&mut self, to_play: bool) -> Result<(), Failure> {
        let names = self.store.playlists()?;
        if names.is_empty() {
            self.show(
                View::new(
                    "No playlists yet. Create one with /ap <playlist> <track name>",
                    Vec::new(),
                ),
                Selection::None,
            );
            return Ok(());
        }

        let lines = descriptor::numbered(&names);
        if to_play {
            self.show(
                View::new("Playlists: type a number to play", lines),
                Selection::Playlists(names),
            );
        } else {
            self.show(View::new("Playlists", lines), Selection::None);
        }
        Ok(())
    }

    /// Show the tracks of playlist `name`. A malformed file is reported and
    /// shown as empty.
    pub(super) fn view_playlist(&mut self, name: &str) -> Result<(), Failure> {
        let entries = match self.store.playlist(name) {
            Ok(entries) => entries,
            Err(e @ StoreError::Json { .. }) => {
                self.fail(e.into());
                self.show(
                    View::new(format!("Playlist {name} could not be read"), Vec::new()),
                    Selection::None,
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let items: Vec<String> = entries.iter().map(|e| e.descriptor()).collect();
        let title = if items.is_empty() {
            format!("Playlist {name} is empty")
        } else {
            format!("Playlist {name}: type a number to play")
        };
        self.show(
            View::new(title, descriptor::numbered(&items)),
            Selection::Tracks {
                purpose: SearchPurpose::Play,
                items,
            },
        );
        Ok(())
    }

    pub(super) fn show_library(&mut self) -> Result<(), Failure> {
        let dir = self.config.music_dir.clone().ok_or_else(|| {
            Failure::usage("No music folder: set library.music_dir or pass a folder as an argument")
        })?;
        self.say(format!("Scanning {}…", dir.display()));
        self.request(Request::ScanLibrary {
            dir,
            settings: self.config.library.clone(),
        });
        Ok(())
    }

    pub(super) fn on_library(&mut self, dir: PathBuf, tracks: Vec<Track>) -> Result<(), Failure> {
        if tracks.is_empty() {
            return Err(Failure::usage(format!(
                "No audio files found in {}",
                dir.display()
            )));
        }

        info!(dir = %dir.display(), count = tracks.len(), "scanned library");
        let items: Vec<String> = tracks.iter().map(|t| t.descriptor()).collect();
        self.say(format!("{} local tracks", tracks.len()));
        self.show(
            View::new(
                format!("{}: type a number to play", dir.display()),
                descriptor::numbered(&items),
            ),
            Selection::Library(tracks),
        );
        Ok(())
    }
}
