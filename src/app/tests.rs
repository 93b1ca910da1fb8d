use super::*;
use crate::audio::EngineState;

fn typed(app: &mut App, text: &str) {
    for c in text.chars() {
        app.push_char(c);
    }
}

#[test]
fn engine_state_maps_to_playback_state() {
    assert_eq!(PlaybackState::from(EngineState::Opening), PlaybackState::Playing);
    assert_eq!(PlaybackState::from(EngineState::Playing), PlaybackState::Playing);
    assert_eq!(PlaybackState::from(EngineState::Paused), PlaybackState::Paused);
    for s in [
        EngineState::Idle,
        EngineState::Ended,
        EngineState::Stopped,
        EngineState::Error,
    ] {
        assert_eq!(PlaybackState::from(s), PlaybackState::Stopped);
    }
}

#[test]
fn submit_trims_and_clears_input() {
    let mut app = App::new();
    typed(&mut app, "  /play hello  ");
    assert_eq!(app.submit().as_deref(), Some("/play hello"));
    assert_eq!(app.input(), "");
    assert_eq!(app.history(), ["/play hello".to_string()]);
}

#[test]
fn blank_submit_is_ignored() {
    let mut app = App::new();
    typed(&mut app, "   ");
    assert_eq!(app.submit(), None);
    assert!(app.history().is_empty());
}

#[test]
fn repeated_line_is_recorded_once() {
    let mut app = App::new();
    for _ in 0..3 {
        typed(&mut app, "/next");
        app.submit();
    }
    assert_eq!(app.history().len(), 1);
}

#[test]
fn backspace_and_cursor_count_chars() {
    let mut app = App::new();
    typed(&mut app, "Beyoncé");
    assert_eq!(app.cursor(), 7);
    app.backspace();
    assert_eq!(app.input(), "Beyonc");
}

#[test]
fn history_browsing_restores_draft() {
    let mut app = App::new();
    typed(&mut app, "/play one");
    app.submit();
    typed(&mut app, "/play two");
    app.submit();

    typed(&mut app, "/vo");
    app.history_prev();
    assert_eq!(app.input(), "/play two");
    app.history_prev();
    assert_eq!(app.input(), "/play one");
    app.history_prev();
    assert_eq!(app.input(), "/play one");

    app.history_next();
    assert_eq!(app.input(), "/play two");
    app.history_next();
    assert_eq!(app.input(), "/vo");
}

#[test]
fn history_is_capped() {
    let mut app = App::new();
    for i in 0..HISTORY_CAP + 5 {
        typed(&mut app, &format!("/volume {i}"));
        app.submit();
    }
    assert_eq!(app.history().len(), HISTORY_CAP);
    assert_eq!(app.history()[0], "/volume 5");
}
