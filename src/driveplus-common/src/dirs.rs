//! Data directory resolution.
//!
//! The session file lives in a single directory, resolved in this order:
//! 1. `data_dir` from the loaded configuration
//! 2. `DRIVEPLUS_HOME` environment variable
//! 3. the platform data directory joined with `driveplus`
//!    (`~/.local/share/driveplus`, `~/Library/Application Support/driveplus`,
//!    `%APPDATA%\driveplus`)

use std::path::{Path, PathBuf};

use crate::config::DriveplusConfig;

/// Application name for directory paths
pub const APP_NAME: &str = "driveplus";

/// File holding the persisted OAuth session.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "DRIVEPLUS_HOME";

/// Resolve the data directory for the given configuration.
///
/// Returns `None` only when no override is set and the platform exposes no
/// data or home directory.
pub fn data_dir(config: &DriveplusConfig) -> Option<PathBuf> {
    if let Some(dir) = &config.data_dir {
        return Some(dir.clone());
    }

    if let Ok(home) = std::env::var(HOME_ENV_VAR)
        && !home.trim().is_empty()
    {
        return Some(absolutize(PathBuf::from(home)));
    }

    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .map(|d| d.join(APP_NAME))
}

/// Path of the session file inside a data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

// Relative overrides would otherwise follow the process cwd around.
fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
