use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/reprise/config.toml` or `~/.config/reprise/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `REPRISE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub catalog: CatalogSettings,
    pub resolver: ResolverSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Session volume at startup (0-100). Not persisted between runs.
    pub default_volume: u8,
    /// How often the session polls the engine for progress and track end.
    pub poll_interval_ms: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Timeout for downloading a stream before playback starts.
    pub download_timeout_secs: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 50,
            poll_interval_ms: 1000,
            quit_fade_out_ms: 300,
            download_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ reprise: type /help for commands ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Seconds skipped by `/sf` and `/sb` when no argument is given.
    pub skip_seconds: u64,
    /// Volume step for the PageUp / PageDown keys.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            skip_seconds: 10,
            volume_step: 5,
        }
    }
}

/// Spotify Web API access (client-credentials flow).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub api_url: String,
    pub market: String,
    /// Number of search results shown by `/play` and friends.
    pub search_limit: u8,
    /// Timeout applied to every catalog request.
    pub timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            market: "US".to_string(),
            search_limit: 10,
            timeout_secs: 15,
        }
    }
}

impl CatalogSettings {
    /// Fill missing credentials from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`.
    pub fn fill_from_env(&mut self) {
        if self.client_id.is_none() {
            self.client_id = std::env::var("SPOTIFY_CLIENT_ID").ok();
        }
        if self.client_secret.is_none() {
            self.client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").ok();
        }
    }
}

/// Stream URL extraction through `yt-dlp`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Extractor executable, looked up on `PATH` unless absolute.
    pub program: String,
    /// Appended to a descriptor to bias the search toward official uploads.
    pub query_suffix: String,
    /// How long a resolved stream URL is reused before resolving again.
    pub cache_ttl_secs: u64,
    /// Extractor runs longer than this are killed.
    pub timeout_secs: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            query_suffix: " official music video".to_string(),
            cache_ttl_secs: 30 * 60,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Local music folder browsed by `/library`.
    pub music_dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_dir: None,
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}
