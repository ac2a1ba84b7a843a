mod config;

pub use config::{Config, CueSettings};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/roundclock[-dev]/` based on ROUNDCLOCK_ENV.
///
/// Set ROUNDCLOCK_ENV=dev to use development data directory.
/// Set ROUNDCLOCK_HOME to use an explicit directory instead.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ROUNDCLOCK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ROUNDCLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("roundclock-dev")
            } else {
                base_dir.join("roundclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
