use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::config;
use crate::mpris::ControlCmd;
use crate::resolver::{ResolverWorker, StreamingBackend};
use crate::session::{Session, SessionConfig};
use crate::store::UserStore;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;

/// Directory name under the config dir holding recents and playlists.
const USERFILES: &str = "userfiles";

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = config::config_dir().unwrap_or_else(env::temp_dir);
    if let Err(e) = logging::init_logging(&config_dir) {
        eprintln!("reprise: logging disabled: {e}");
    }

    let settings = settings::load_settings();
    let music_dir = env::args().nth(1).map(PathBuf::from);
    info!(config_dir = %config_dir.display(), ?music_dir, "starting");

    let store = UserStore::new(config_dir.join(USERFILES));
    info!(userfiles = %store.root().display(), "user data");
    let engine = AudioPlayer::new(&settings.audio);
    let backend = StreamingBackend::new(settings.catalog.clone(), &settings.resolver);
    let mut worker = ResolverWorker::spawn(Box::new(backend));
    let mut session = Session::new(
        engine,
        store,
        SessionConfig::from_settings(&settings, music_dir),
    );
    let mut app = App::new();

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = {
        let mut state = event_loop::EventLoopState::new(&settings);
        let channels = event_loop::Channels {
            worker: &worker,
            mpris: &mpris,
            control_rx: &control_rx,
        };
        event_loop::run(
            &mut terminal,
            &settings,
            &mut session,
            &mut app,
            &channels,
            &mut state,
        )
    };

    if let Err(e) = &run_result {
        warn!(error = %e, "event loop failed");
    }

    // Give the terminal back before waiting on the audio fade-out.
    let restored = restore_terminal(&mut terminal);
    session
        .engine()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    worker.shutdown();

    info!("bye");
    restored?;
    run_result
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
) -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

#[cfg(test)]
mod tests;
