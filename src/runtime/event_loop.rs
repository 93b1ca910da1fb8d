use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, PlaybackState};
use crate::audio::PlaybackEngine;
use crate::command::{Command, Input};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::resolver::{ResolveError, ResolverWorker};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::session::Session;
use crate::ui;

/// How long to wait for a key before running the rest of the loop again.
const INPUT_WAIT: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    last_poll: Instant,
    poll_interval: Duration,
    /// What MPRIS last saw.
    mpris: MprisSnapshot,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        Self {
            last_poll: Instant::now(),
            poll_interval: Duration::from_millis(settings.audio.poll_interval_ms.max(1)),
            mpris: MprisSnapshot::default(),
        }
    }
}

/// Everything the loop talks to besides the session.
pub struct Channels<'a> {
    pub worker: &'a ResolverWorker,
    pub mpris: &'a MprisHandle,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
}

/// Main terminal event loop: feeds prompt input, resolver answers, media
/// keys and the playback tick into the session, and redraws. Returns `Ok(())`
/// once the session asks to quit.
pub fn run<E: PlaybackEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    session: &mut Session<E>,
    app: &mut App,
    channels: &Channels<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Some(response) = channels.worker.try_recv() {
            session.on_response(response);
        }

        if state.last_poll.elapsed() >= state.poll_interval {
            session.poll();
            state.last_poll = Instant::now();
        }

        for request in session.take_requests() {
            debug!(?request, "to resolver");
            if let Err(request) = channels.worker.send(request) {
                // Release whatever waits on the answer instead of loading forever.
                let lost = ResolveError::Unavailable("resolver stopped".to_string());
                if let Some(response) = request.failed(lost) {
                    session.on_response(response);
                }
            }
        }

        // Covers changes from media keys and auto-advance as well as the prompt.
        update_mpris(channels.mpris, session, &mut state.mpris);

        terminal.draw(|f| ui::draw(f, session, app, &settings.ui))?;

        while let Ok(cmd) = channels.control_rx.try_recv() {
            debug!(?cmd, "media key");
            let command = control_command(cmd, session.playback_state());
            session.handle(Input::Command(command));
        }

        if session.should_quit() {
            return Ok(());
        }

        if event::poll(INPUT_WAIT)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(key, settings, session, app);
            }
        }

        if session.should_quit() {
            return Ok(());
        }
    }
}

/// Map a media-key command to the prompt command with the same effect.
pub fn control_command(cmd: ControlCmd, playback: PlaybackState) -> Command {
    match cmd {
        ControlCmd::Quit => Command::Quit,
        ControlCmd::Play => Command::Resume,
        ControlCmd::Pause => Command::Pause,
        ControlCmd::PlayPause => match playback {
            PlaybackState::Paused => Command::Resume,
            PlaybackState::Playing | PlaybackState::Stopped => Command::Pause,
        },
        ControlCmd::Stop => Command::Stop,
        ControlCmd::Next => Command::Next,
        ControlCmd::Prev => Command::Prev,
    }
}

fn handle_key_event<E: PlaybackEngine>(
    key: KeyEvent,
    settings: &config::Settings,
    session: &mut Session<E>,
    app: &mut App,
) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        session.handle(Input::Command(Command::Quit));
        return;
    }

    let step = i64::from(settings.controls.volume_step);
    match key.code {
        KeyCode::Enter => {
            if let Some(line) = app.submit() {
                session.handle_line(&line);
            }
        }
        KeyCode::Char(c) => app.push_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Esc => app.clear(),
        KeyCode::Up => app.history_prev(),
        KeyCode::Down => app.history_next(),
        KeyCode::PageUp => {
            let v = i64::from(session.volume()) + step;
            session.handle(Input::Command(Command::Volume(v)));
        }
        KeyCode::PageDown => {
            let v = i64::from(session.volume()) - step;
            session.handle(Input::Command(Command::Volume(v)));
        }
        _ => {}
    }
}
