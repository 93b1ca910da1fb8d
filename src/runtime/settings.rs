use tracing::warn;

use crate::config;

/// Load settings, falling back to defaults when the file or environment is
/// unreadable or fails validation.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                warn!(%msg, "invalid config, using defaults");
                let mut defaults = config::Settings::default();
                defaults.catalog.fill_from_env();
                defaults
            } else {
                s
            }
        }
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            let mut defaults = config::Settings::default();
            defaults.catalog.fill_from_env();
            defaults
        }
    }
}
