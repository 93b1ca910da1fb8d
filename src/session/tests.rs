use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::audio::{EngineError, EngineState, MediaSource};
use crate::resolver::{Backend, Request, ResolveError, ResolvedStream, Response, execute};

#[derive(Debug, Default)]
struct FakeEngine {
    state: EngineState,
    position: Duration,
    duration: Option<Duration>,
    volume: u8,
    played: Vec<MediaSource>,
    pauses: usize,
    resumes: usize,
    error: Option<String>,
}

impl PlaybackEngine for FakeEngine {
    fn play(&mut self, source: MediaSource) -> Result<(), EngineError> {
        self.played.push(source);
        self.state = EngineState::Playing;
        self.position = Duration::ZERO;
        self.error = None;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.pauses += 1;
        self.state = EngineState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.resumes += 1;
        self.state = EngineState::Playing;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.state = EngineState::Stopped;
        self.position = Duration::ZERO;
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError> {
        self.volume = volume.min(100);
        Ok(())
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn time(&self) -> Duration {
        self.position
    }

    fn set_time(&mut self, position: Duration) -> Result<(), EngineError> {
        self.position = position;
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn last_error(&self) -> Option<String> {
        self.error.clone()
    }
}

#[derive(Default)]
struct FakeBackend {
    results: HashMap<String, Vec<String>>,
    similar: Vec<String>,
    albums: HashMap<String, Vec<String>>,
    durations: HashMap<String, Duration>,
    resolved: Vec<String>,
    forgotten: Vec<String>,
}

impl Backend for FakeBackend {
    fn search(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        self.results
            .get(query)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }

    fn similar(&mut self, _descriptor: &str) -> Result<Vec<String>, ResolveError> {
        Ok(self.similar.clone())
    }

    fn album(&mut self, query: &str) -> Result<Vec<String>, ResolveError> {
        self.albums
            .get(query)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }

    fn resolve(&mut self, query: &str) -> Result<ResolvedStream, ResolveError> {
        self.resolved.push(query.to_string());
        Ok(ResolvedStream {
            url: format!("http://stream/{query}"),
            duration: self.durations.get(query).copied(),
            title: None,
        })
    }

    fn forget(&mut self, query: &str) {
        self.forgotten.push(query.to_string());
    }
}

impl<E: PlaybackEngine> Session<E> {
    fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

struct Harness {
    session: Session<FakeEngine>,
    backend: FakeBackend,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    fn with_config(config: SessionConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(dir.path().join("userfiles"));
        Self {
            session: Session::new(FakeEngine::default(), store, config),
            backend: FakeBackend::default(),
            dir,
        }
    }

    /// Answer every pending request synchronously, including follow-ups.
    fn drive(&mut self) {
        loop {
            let requests = self.session.take_requests();
            if requests.is_empty() {
                break;
            }
            for r in requests {
                if let Some(resp) = execute(&mut self.backend, r) {
                    self.session.on_response(resp);
                }
            }
        }
    }

    fn line(&mut self, line: &str) {
        self.session.handle_line(line);
        self.drive();
    }

    /// Start `descriptor` playing without going through search.
    fn playing(&mut self, descriptor: &str) {
        self.session.play(descriptor).unwrap();
        self.drive();
    }

    fn engine(&mut self) -> &mut FakeEngine {
        self.session.engine_mut()
    }

    fn status(&self) -> Status {
        self.session.status().cloned().unwrap()
    }

    fn queue(&self) -> Vec<String> {
        self.session.queue().iter().cloned().collect()
    }
}

fn url(query: &str) -> MediaSource {
    MediaSource::Url(format!("http://stream/{query}"))
}

#[test]
fn play_hello_then_pick_first_result() {
    let mut h = Harness::new();
    h.backend.results.insert(
        "hello".into(),
        vec!["1. Hello by Adele".into(), "2. Hello Again by Artist".into()],
    );

    h.line("/play hello");
    assert_eq!(
        h.session.view().lines,
        vec!["1. Hello by Adele", "2. Hello Again by Artist"]
    );
    assert!(h.backend.resolved.is_empty());

    h.line("1");
    assert_eq!(h.backend.resolved, vec!["Hello by Adele official music video"]);
    assert_eq!(
        h.session.engine().played,
        vec![url("Hello by Adele official music video")]
    );
    assert_eq!(h.session.recents()[0], "Hello by Adele");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("Hello by Adele")
    );

    let on_disk = fs::read_to_string(h.dir.path().join("userfiles/recents.txt")).unwrap();
    assert_eq!(on_disk.lines().next(), Some("Hello by Adele"));
}

#[test]
fn volume_is_clamped_to_0_100() {
    let mut h = Harness::new();
    for (input, want) in [(-5, 0), (0, 0), (42, 42), (100, 100), (250, 100)] {
        h.session.set_volume(input).unwrap();
        assert_eq!(h.session.volume(), want);
        assert_eq!(h.session.engine().volume(), want);
    }
}

#[test]
fn default_volume_is_applied_at_startup() {
    let h = Harness::new();
    assert_eq!(h.session.volume(), 50);
    assert_eq!(h.session.engine().volume, 50);
}

#[test]
fn skip_forward_stops_at_track_end() {
    let mut h = Harness::new();
    h.backend.durations.insert(
        "Song by Band official music video".into(),
        Duration::from_secs(200),
    );
    h.playing("Song by Band");

    h.engine().position = Duration::from_secs(100);
    h.session.skip_forward(10).unwrap();
    assert_eq!(h.session.engine().time(), Duration::from_secs(110));

    h.engine().position = Duration::from_secs(195);
    h.session.skip_forward(10).unwrap();
    assert_eq!(h.session.engine().time(), Duration::from_secs(200));
}

#[test]
fn skip_forward_without_known_length_is_unclamped() {
    let mut h = Harness::new();
    h.playing("Song by Band");
    h.engine().position = Duration::from_secs(10);

    h.line("/sf");
    assert_eq!(h.session.engine().time(), Duration::from_secs(20));
    h.line("/sf 45");
    assert_eq!(h.session.engine().time(), Duration::from_secs(65));
}

#[test]
fn skip_backward_never_goes_negative() {
    let mut h = Harness::new();
    h.playing("Song by Band");
    h.engine().position = Duration::from_secs(30);

    h.session.skip_backward(10).unwrap();
    assert_eq!(h.session.engine().time(), Duration::from_secs(20));
    h.session.skip_backward(25).unwrap();
    assert_eq!(h.session.engine().time(), Duration::ZERO);
}

#[test]
fn skipping_with_nothing_playing_is_reported() {
    let mut h = Harness::new();
    h.line("/sf 10");
    assert!(h.status().is_error);
    assert_eq!(h.status().text, "Nothing is playing");
}

#[test]
fn ended_track_advances_exactly_one_queue_entry() {
    let mut h = Harness::new();
    h.playing("First by A");
    h.session.enqueue("Second by B");
    h.session.enqueue("Third by C");
    h.engine().state = EngineState::Ended;

    h.session.poll();
    let requests = h.session.take_requests();
    assert_eq!(
        requests,
        vec![Request::Resolve {
            descriptor: "Second by B".into(),
            query: "Second by B official music video".into(),
        }]
    );
    assert_eq!(h.queue(), vec!["Third by C"]);

    // A second tick while the resolve is in flight must not pop again.
    h.session.poll();
    assert!(h.session.take_requests().is_empty());

    for r in requests {
        if let Some(resp) = execute(&mut h.backend, r) {
            h.session.on_response(resp);
        }
    }
    assert_eq!(h.session.engine().played.len(), 2);
    assert_eq!(
        h.session.engine().played[1],
        url("Second by B official music video")
    );
}

#[test]
fn ended_with_empty_queue_stays_put() {
    let mut h = Harness::new();
    h.playing("Only by One");
    h.engine().state = EngineState::Ended;
    h.session.poll();
    assert!(h.session.take_requests().is_empty());
    assert_eq!(h.session.engine().played.len(), 1);
}

#[test]
fn stale_resolve_is_discarded() {
    let mut h = Harness::new();
    h.session.play("Old by A").unwrap();
    let old = h.session.take_requests();
    h.session.play("New by B").unwrap();
    let new = h.session.take_requests();

    for r in old.into_iter().chain(new) {
        if let Some(resp) = execute(&mut h.backend, r) {
            h.session.on_response(resp);
        }
    }
    assert_eq!(
        h.session.engine().played,
        vec![url("New by B official music video")]
    );
    assert_eq!(h.session.recents(), ["New by B".to_string()]);
}

#[test]
fn autofill_appends_similar_tracks_except_current_song() {
    let mut h = Harness::new();
    h.backend.similar = vec![
        "Hello by Adele".into(),
        "Skyfall by Adele".into(),
        "Hello (Live) by Adele".into(),
        "Rolling in the Deep by Adele".into(),
    ];
    h.playing("Hello by Adele");

    h.session.poll();
    h.drive();
    assert_eq!(h.queue(), vec!["Skyfall by Adele", "Rolling in the Deep by Adele"]);

    // Queue is non-empty now: no further suggestion requests.
    h.session.poll();
    assert!(h.session.take_requests().is_empty());
}

#[test]
fn only_one_suggestion_request_in_flight() {
    let mut h = Harness::new();
    h.playing("Hello by Adele");
    h.session.poll();
    h.session.poll();
    let similar: Vec<_> = h
        .session
        .take_requests()
        .into_iter()
        .filter(|r| matches!(r, Request::Similar { .. }))
        .collect();
    assert_eq!(similar.len(), 1);
}

#[test]
fn empty_suggestions_retry_on_next_tick() {
    let mut h = Harness::new();
    h.playing("Hello by Adele");
    h.session.poll();
    h.drive();
    assert!(h.queue().is_empty());

    h.session.poll();
    assert_eq!(
        h.session.take_requests(),
        vec![Request::Similar {
            descriptor: "Hello by Adele".into()
        }]
    );
}

#[test]
fn clearing_the_queue_turns_autofill_off_until_next_play() {
    let mut h = Harness::new();
    h.backend.similar = vec!["Other by X".into()];
    h.playing("Hello by Adele");
    h.session.enqueue("Queued by Q");

    h.line("/clq");
    assert!(h.queue().is_empty());
    assert!(!h.session.autofill());
    h.session.poll();
    assert!(h.session.take_requests().is_empty());

    h.backend
        .results
        .insert("x".into(), vec!["1. Picked by P".into()]);
    h.line("/play x");
    h.line("1");
    assert!(h.session.autofill());
}

#[test]
fn engine_error_is_reported_forgotten_and_skipped() {
    let mut h = Harness::new();
    h.playing("Broken by B");
    h.session.enqueue("Next by N");
    h.engine().state = EngineState::Error;
    h.engine().error = Some("decoder failed".into());

    h.session.poll();
    assert!(h.status().is_error);
    assert!(h.status().text.contains("decoder failed"));
    assert!(h.session.current().is_none());
    h.drive();

    assert_eq!(h.backend.forgotten, vec!["Broken by B official music video"]);
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("Next by N")
    );
}

#[test]
fn pause_and_resume_are_noops_in_target_state() {
    let mut h = Harness::new();
    h.playing("Song by Band");

    h.line("/pause");
    h.line("/ps");
    assert_eq!(h.session.engine().pauses, 1);
    assert_eq!(h.session.playback_state(), PlaybackState::Paused);

    h.line("/resume");
    h.line("/r");
    assert_eq!(h.session.engine().resumes, 1);
    assert_eq!(h.session.playback_state(), PlaybackState::Playing);
}

#[test]
fn stop_clears_current_track() {
    let mut h = Harness::new();
    h.playing("Song by Band");
    h.line("/stop");
    assert!(h.session.current().is_none());
    assert_eq!(h.session.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.session.engine().state, EngineState::Stopped);
}

#[test]
fn queue_add_picks_into_the_back_of_the_queue() {
    let mut h = Harness::new();
    h.backend
        .results
        .insert("song".into(), vec!["1. A by X".into(), "2. B by Y".into()]);
    h.session.enqueue("Existing by E");

    h.line("/qa song");
    h.line("2");
    assert_eq!(h.queue(), vec!["Existing by E", "B by Y"]);
    assert!(h.session.engine().played.is_empty());
}

#[test]
fn queue_position_is_one_based() {
    let mut h = Harness::new();
    for d in ["A by 1", "B by 2", "C by 3"] {
        h.session.enqueue(d);
    }

    h.line("/qp 0");
    assert!(h.status().is_error);
    h.line("/qp 4");
    assert!(h.status().is_error);
    assert_eq!(h.queue().len(), 3);

    h.line("/qp 2");
    assert_eq!(h.queue(), vec!["A by 1", "C by 3"]);
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("B by 2")
    );
}

#[test]
fn next_pops_front_and_reports_empty_queue() {
    let mut h = Harness::new();
    h.line("/next");
    assert_eq!(h.status().text, "The queue is empty");

    h.session.enqueue("A by 1");
    h.session.enqueue("B by 2");
    h.line("/next");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("A by 1")
    );
    assert_eq!(h.queue(), vec!["B by 2"]);
}

#[test]
fn prev_replays_last_track_and_requeues_current() {
    let mut h = Harness::new();
    h.playing("Earlier by E");
    h.playing("Now by N");

    h.line("/prev");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("Earlier by E")
    );
    assert_eq!(h.queue(), vec!["Now by N"]);
}

#[test]
fn playlists_add_view_and_play() {
    let mut h = Harness::new();
    h.backend.results.insert(
        "hello".into(),
        vec!["1. Hello by Adele".into(), "2. Halo by Beyonce".into()],
    );
    h.line("/ap mix hello");
    h.line("1");
    h.line("2");
    assert!(h.status().text.contains("(2 tracks)"));

    h.line("/vp mix");
    assert_eq!(
        h.session.view().lines,
        vec!["1. Halo by Beyonce", "2. Hello by Adele"]
    );

    h.session.enqueue("Already by Q");
    h.line("/pt");
    assert_eq!(h.session.view().lines, vec!["1. mix"]);
    h.line("1");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("Halo by Beyonce")
    );
    assert_eq!(h.queue(), vec!["Hello by Adele", "Already by Q"]);
}

#[test]
fn malformed_playlist_is_reported_not_swallowed() {
    let mut h = Harness::new();
    let dir = h.dir.path().join("userfiles/playlists");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("bad.json"), "{ not json").unwrap();

    h.line("/vp bad");
    assert!(h.status().is_error);
    assert!(h.status().text.contains("malformed playlist"));
    assert_eq!(h.session.view().title, "Help");
}

#[test]
fn bad_playlist_name_is_rejected() {
    let mut h = Harness::new();
    h.line("/vp ../escape");
    assert!(h.status().is_error);
}

#[test]
fn album_plays_first_and_queues_the_rest_up_front() {
    let mut h = Harness::new();
    h.backend.albums.insert(
        "25".into(),
        vec![
            "Hello by Adele".into(),
            "Send My Love by Adele".into(),
            "I Miss You by Adele".into(),
        ],
    );
    h.session.enqueue("Later by L");

    h.line("/alb 25");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("Hello by Adele")
    );
    assert_eq!(
        h.queue(),
        vec!["Send My Love by Adele", "I Miss You by Adele", "Later by L"]
    );
}

#[test]
fn unknown_album_is_reported() {
    let mut h = Harness::new();
    h.line("/alb nothing");
    assert!(h.status().is_error);
    assert!(h.session.current().is_none());
}

#[test]
fn recents_view_is_selectable() {
    let mut h = Harness::new();
    h.playing("One by 1");
    h.playing("Two by 2");

    h.line("/recents");
    assert_eq!(h.session.view().lines, vec!["1. Two by 2", "2. One by 1"]);
    h.line("2");
    assert_eq!(
        h.session.current().map(|c| c.descriptor.as_str()),
        Some("One by 1")
    );
}

#[test]
fn parse_errors_land_on_the_status_line() {
    let mut h = Harness::new();
    h.line("/volume loud");
    assert!(h.status().is_error);
    assert_eq!(h.status().text, "/volume expects a number");

    h.line("/bogus");
    assert_eq!(
        h.status().text,
        "Invalid command. You can see the list of commands using /help"
    );
    assert_eq!(h.session.volume(), 50);
}

#[test]
fn selecting_without_a_list_is_reported() {
    let mut h = Harness::new();
    h.line("1");
    assert!(h.status().is_error);
    assert!(h.session.engine().played.is_empty());
}

#[test]
fn failed_search_keeps_previous_view() {
    let mut h = Harness::new();
    h.line("/help");
    let before = h.session.view().clone();
    h.line("/play nothing-matches");
    assert!(h.status().is_error);
    assert_eq!(h.session.view(), &before);
}

#[test]
fn library_plays_local_files_without_resolving() {
    let music = tempfile::tempdir().unwrap();
    fs::write(music.path().join("b-side.mp3"), b"not real").unwrap();
    fs::write(music.path().join("a-side.mp3"), b"not real").unwrap();

    let config = SessionConfig {
        music_dir: Some(music.path().to_path_buf()),
        ..SessionConfig::default()
    };
    let mut h = Harness::with_config(config);

    h.line("/library");
    assert_eq!(h.session.view().lines.len(), 2);
    h.line("1");

    assert!(h.backend.resolved.is_empty());
    assert_eq!(
        h.session.engine().played,
        vec![MediaSource::File(music.path().join("a-side.mp3"))]
    );
    assert!(h.session.current().unwrap().query.is_none());
}

#[test]
fn library_scan_runs_off_the_session() {
    let music = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        music_dir: Some(music.path().to_path_buf()),
        ..SessionConfig::default()
    };
    let mut h = Harness::with_config(config);

    h.session.handle_line("/library");
    assert!(h.status().text.starts_with("Scanning"));
    assert_eq!(h.session.view().title, "Help");
    assert_eq!(
        h.session.take_requests(),
        vec![Request::ScanLibrary {
            dir: music.path().to_path_buf(),
            settings: crate::config::LibrarySettings::default(),
        }]
    );

    h.session.on_response(Response::Library {
        dir: music.path().to_path_buf(),
        result: Ok(Vec::new()),
    });
    assert!(h.status().is_error);
}

#[test]
fn lost_resolver_answer_releases_loading() {
    let mut h = Harness::new();
    h.session.enqueue("B by Y");
    h.session.play("A by X").unwrap();
    assert!(h.session.loading().is_some());

    let lost = ResolveError::Unavailable("resolver stopped".into());
    for request in h.session.take_requests() {
        if let Some(response) = request.failed(lost.clone()) {
            h.session.on_response(response);
        }
    }
    assert!(h.session.loading().is_none());
    assert!(h.status().is_error);

    h.session.next().unwrap();
    h.drive();
    assert_eq!(h.session.current().unwrap().descriptor, "B by Y");
}

#[test]
fn library_without_folder_is_reported() {
    let mut h = Harness::new();
    h.line("/lib");
    assert!(h.status().is_error);
}

#[test]
fn quit_sets_flag() {
    let mut h = Harness::new();
    assert!(!h.session.should_quit());
    h.line("/q");
    assert!(h.session.should_quit());
}
