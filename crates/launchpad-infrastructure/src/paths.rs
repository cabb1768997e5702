//! Unified path management for launchpad files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/launchpad/         # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/launchpad/    # Data directory
//! └── state/                   # Key-value records (one JSON file per key)
//!     ├── generation-state.json
//!     └── generated-reports.json
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "launchpad";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for launchpad_core::LaunchpadError {
    fn from(e: PathError) -> Self {
        Self::config(e.to_string())
    }
}

/// Platform paths for launchpad (XDG on Linux, the native locations elsewhere).
pub struct LaunchpadPaths;

impl LaunchpadPaths {
    /// Returns the launchpad configuration directory (e.g. `~/.config/launchpad/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the launchpad data directory (e.g. `~/.local/share/launchpad/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the directory holding persisted key-value records.
    pub fn state_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("state"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_app_dirs() {
        if let (Ok(config_dir), Ok(config_file)) =
            (LaunchpadPaths::config_dir(), LaunchpadPaths::config_file())
        {
            assert!(config_dir.ends_with(APP_DIR));
            assert_eq!(config_file.parent(), Some(config_dir.as_path()));
        }
        if let Ok(state_dir) = LaunchpadPaths::state_dir() {
            assert!(state_dir.ends_with("launchpad/state"));
        }
    }
}
