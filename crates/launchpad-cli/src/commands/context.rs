use anyhow::{Context, Result};
use launchpad_core::config::RootConfig;
use launchpad_core::report::ReportCatalog;
use launchpad_core::storage::KeyValueStore;
use launchpad_infrastructure::{
    ConfigService, FileKeyValueStore, KvFinalReportsRepository, KvGenerationStateRepository,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration and storage shared by every command.
pub struct AppContext {
    pub config: RootConfig,
    store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    pub fn load(config_path: Option<PathBuf>, state_dir: Option<PathBuf>) -> Result<Self> {
        let service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };
        let config = service.get_config();

        let file_store = match state_dir {
            Some(dir) => FileKeyValueStore::new(dir),
            None => FileKeyValueStore::default_location()
                .context("Failed to resolve the state directory")?,
        };
        tracing::debug!("[Cli] State directory: {}", file_store.root().display());

        Ok(Self {
            config,
            store: Arc::new(file_store),
        })
    }

    pub fn catalog(&self) -> ReportCatalog {
        ReportCatalog::standard()
    }

    pub fn state_repository(&self) -> Arc<KvGenerationStateRepository> {
        Arc::new(KvGenerationStateRepository::new(self.store.clone()))
    }

    pub fn reports_repository(&self) -> Arc<KvFinalReportsRepository> {
        Arc::new(KvFinalReportsRepository::new(self.store.clone()))
    }
}
