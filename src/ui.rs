//! UI rendering for the terminal dashboard.
//!
//! Everything drawn here is read from the session and the prompt; rendering
//! never mutates either.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, PlaybackState};
use crate::audio::PlaybackEngine;
use crate::config::UiSettings;
use crate::descriptor;
use crate::session::Session;

/// Colours the now-playing line cycles through, indexed by the session accent.
const ACCENTS: [Color; 8] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::LightBlue,
    Color::LightRed,
    Color::LightMagenta,
    Color::LightCyan,
];

fn accent_color(accent: u8) -> Color {
    ACCENTS[accent as usize % ACCENTS.len()]
}

/// Format a `Duration` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Fraction of `total` covered by `elapsed`, in `0.0..=1.0`.
pub fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> f64 {
    match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

fn state_symbol(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "▶",
        PlaybackState::Paused => "⏸",
        PlaybackState::Stopped => "■",
    }
}

/// Time text for the status box: `elapsed / total`, or just elapsed when the
/// length is unknown.
fn time_text(elapsed: Duration, total: Option<Duration>) -> String {
    match total {
        Some(t) => format!("{} / {}", format_time(elapsed), format_time(t)),
        None => format_time(elapsed),
    }
}

fn now_playing_lines<E: PlaybackEngine>(session: &Session<E>) -> Vec<Line<'static>> {
    let state = session.playback_state();
    let accent = Style::default()
        .fg(accent_color(session.accent()))
        .add_modifier(Modifier::BOLD);

    let title = match (session.current(), session.loading()) {
        (_, Some(loading)) => Line::from(vec![
            Span::raw("Loading "),
            Span::raw(loading.descriptor.clone()).italic(),
            Span::raw("..."),
        ]),
        (Some(now), None) => match descriptor::split(&now.descriptor) {
            Some((name, artist)) => Line::from(vec![
                Span::styled(name.to_string(), accent),
                Span::raw(" by "),
                Span::styled(artist.to_string(), accent.remove_modifier(Modifier::BOLD)),
            ]),
            None => Line::from(Span::styled(now.descriptor.clone(), accent)),
        },
        (None, None) => Line::from("Nothing playing").dim(),
    };

    let total = session.current().and_then(|c| c.duration);
    let mut details = vec![Span::raw(format!("{} ", state_symbol(state)))];
    if session.current().is_some() {
        details.push(Span::raw(time_text(session.elapsed(), total)));
        details.push(Span::raw("  •  "));
    }
    details.push(Span::raw(format!("vol {}%", session.volume())));
    let queued = session.queue().len();
    if queued > 0 {
        details.push(Span::raw(format!("  •  {queued} queued")));
    }
    if !session.autofill() {
        details.push(Span::raw("  •  autofill off").dim());
    }

    vec![title, Line::from(details)]
}

/// Render the whole dashboard into `frame`.
pub fn draw<E: PlaybackEngine>(
    frame: &mut Frame,
    session: &Session<E>,
    app: &App,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" reprise ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing: two text lines over a progress gauge.
    let status_block = Block::bordered()
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
        .title(" now playing ");
    let inner = status_block.inner(chunks[1]);
    frame.render_widget(status_block, chunks[1]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(now_playing_lines(session)), rows[0]);

    let total = session.current().and_then(|c| c.duration);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(accent_color(session.accent())))
        .ratio(progress_ratio(session.elapsed(), total))
        .label("");
    frame.render_widget(gauge, rows[1]);

    // Dashboard
    let view = session.view();
    let items: Vec<ListItem> = view
        .lines
        .iter()
        .map(|l| ListItem::new(l.as_str()))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.title)),
    );
    frame.render_widget(list, chunks[2]);

    // Status line
    let status = match session.status() {
        Some(s) if s.is_error => Paragraph::new(s.text.as_str()).fg(Color::Red),
        Some(s) => Paragraph::new(s.text.as_str()),
        None => Paragraph::new(""),
    };
    frame.render_widget(status, chunks[3]);

    // Prompt
    let prompt = Paragraph::new(format!("> {}", app.input()))
        .block(Block::default().borders(Borders::ALL).title(" command "));
    frame.render_widget(prompt, chunks[4]);

    let max_x = chunks[4].x + chunks[4].width.saturating_sub(2);
    let x = (chunks[4].x + 3).saturating_add(u16::try_from(app.cursor()).unwrap_or(u16::MAX));
    frame.set_cursor_position(Position::new(x.min(max_x), chunks[4].y + 1));
}
