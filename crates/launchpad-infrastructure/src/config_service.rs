//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/launchpad/config.toml).

use crate::paths::LaunchpadPaths;
use launchpad_core::config::RootConfig;
use launchpad_core::error::{LaunchpadError, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file is created with default values; an unreadable one falls back
/// to defaults with a warning so a bad edit never blocks generation.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config file location.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        if let Ok(read_lock) = self.config.read() {
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Falling back to default config: {}", e);
            RootConfig::default()
        });

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(LaunchpadPaths::config_file()?),
        }
    }

    /// Loads RootConfig from the config file, writing defaults when it is missing.
    fn load_config(&self) -> Result<RootConfig> {
        let config_path = self.config_path()?;

        if !config_path.exists() {
            let default_config = RootConfig::default();
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&config_path, toml::to_string_pretty(&default_config)?)?;
            tracing::info!(
                "[ConfigService] Created default config at {}",
                config_path.display()
            );
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content).map_err(|e| {
            LaunchpadError::config(format!("{}: {}", config_path.display(), e))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(&path);

        let config = service.get_config();

        assert_eq!(config, RootConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_reads_overrides_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[generation]\nstuck_threshold_secs = 30\n").unwrap();
        let service = ConfigService::with_path(&path);

        assert_eq!(service.get_config().generation.stuck_threshold_secs, 30);

        fs::write(&path, "[generation]\nstuck_threshold_secs = 45\n").unwrap();
        assert_eq!(service.get_config().generation.stuck_threshold_secs, 30);

        service.invalidate_cache();
        assert_eq!(service.get_config().generation.stuck_threshold_secs, 45);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[generation\nbroken").unwrap();

        let config = ConfigService::with_path(&path).get_config();
        assert_eq!(config, RootConfig::default());
    }
}
