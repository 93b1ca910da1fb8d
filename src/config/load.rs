use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `REPRISE__`), and falls back to struct defaults.
impl Settings {
    /// Load settings from the optional config file and environment.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("REPRISE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let mut settings: Settings = cfg.try_deserialize()?;
        settings.catalog.fill_from_env();
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.poll_interval_ms == 0 {
            return Err("audio.poll_interval_ms must be >= 1".to_string());
        }
        if self.audio.default_volume > 100 {
            return Err("audio.default_volume must be between 0 and 100".to_string());
        }
        if !(1..=50).contains(&self.catalog.search_limit) {
            return Err("catalog.search_limit must be between 1 and 50".to_string());
        }
        if self.resolver.timeout_secs == 0 {
            return Err("resolver.timeout_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Directory holding `config.toml`, the log file and `userfiles/`.
///
/// `REPRISE_CONFIG_DIR` wins over the XDG default.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(p) = env::var_os("REPRISE_CONFIG_DIR") {
        return Some(PathBuf::from(p));
    }
    default_config_dir()
}

/// Resolve the config file from `REPRISE_CONFIG_PATH` or `<config_dir>/config.toml`.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("REPRISE_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    config_dir().map(|d| d.join("config.toml"))
}

/// `$XDG_CONFIG_HOME/reprise`, or `~/.config/reprise` when `XDG_CONFIG_HOME`
/// is not set.
pub fn default_config_dir() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("reprise"))
}
