//! Prompt model types: `App` and `PlaybackState`.

use crate::audio::EngineState;

/// Playback state as shown on the dashboard and over MPRIS.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl From<EngineState> for PlaybackState {
    fn from(state: EngineState) -> Self {
        match state {
            EngineState::Opening | EngineState::Playing => Self::Playing,
            EngineState::Paused => Self::Paused,
            EngineState::Idle | EngineState::Ended | EngineState::Stopped | EngineState::Error => {
                Self::Stopped
            }
        }
    }
}

/// Maximum number of submitted lines kept for Up/Down recall.
pub const HISTORY_CAP: usize = 100;

/// The command prompt: input buffer plus submitted-line history.
#[derive(Debug, Default)]
pub struct App {
    input: String,
    history: Vec<String>,
    /// Index into `history` while browsing with Up/Down.
    browsing: Option<usize>,
    /// What was typed before browsing started, restored past the newest entry.
    draft: String,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor column in characters, for placing the terminal cursor.
    pub fn cursor(&self) -> usize {
        self.input.chars().count()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn push_char(&mut self, c: char) {
        self.browsing = None;
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.browsing = None;
        self.input.pop();
    }

    pub fn clear(&mut self) {
        self.browsing = None;
        self.input.clear();
    }

    /// Take the current line. Blank lines return `None` and are not recorded.
    pub fn submit(&mut self) -> Option<String> {
        self.browsing = None;
        self.draft.clear();
        let line = std::mem::take(&mut self.input);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if self.history.last().map(String::as_str) != Some(line) {
            self.history.push(line.to_string());
            if self.history.len() > HISTORY_CAP {
                self.history.remove(0);
            }
        }
        Some(line.to_string())
    }

    /// Recall the previous (older) history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let idx = match self.browsing {
            None => {
                self.draft = self.input.clone();
                self.history.len() - 1
            }
            Some(i) => i.saturating_sub(1),
        };
        self.browsing = Some(idx);
        self.input = self.history[idx].clone();
    }

    /// Move toward newer entries, ending back at the unfinished draft.
    pub fn history_next(&mut self) {
        let Some(i) = self.browsing else {
            return;
        };
        if i + 1 < self.history.len() {
            self.browsing = Some(i + 1);
            self.input = self.history[i + 1].clone();
        } else {
            self.browsing = None;
            self.input = std::mem::take(&mut self.draft);
        }
    }
}
