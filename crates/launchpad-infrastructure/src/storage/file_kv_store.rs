//! File-backed key-value store.

use super::atomic_json::AtomicJsonFile;
use crate::paths::LaunchpadPaths;
use async_trait::async_trait;
use launchpad_core::error::{LaunchpadError, Result};
use launchpad_core::storage::KeyValueStore;
use std::path::{Path, PathBuf};

/// Key-value store keeping one atomic JSON file per key.
///
/// Blocking file I/O runs on the blocking pool so the async runtime is never
/// stalled by fsync.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store in the default state directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(LaunchpadPaths::state_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, key: &str) -> Result<AtomicJsonFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(LaunchpadError::storage(format!(
                "Invalid storage key '{}'",
                key
            )));
        }
        Ok(AtomicJsonFile::new(self.root.join(format!("{}.json", key))))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LaunchpadError::internal(format!("Failed to join task: {}", e)))?
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key)?;
        run_blocking(move || Ok(file.read()?)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let file = self.file_for(key)?;
        run_blocking(move || Ok(file.write(&value)?)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key)?;
        run_blocking(move || Ok(file.remove()?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store
            .set("generation-state", r#"{"a":1}"#.to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("generation-state").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(temp_dir.path().join("generation-state.json").exists());

        store.remove("generation-state").await.unwrap();
        assert!(store.get("generation-state").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("not-yet-created"));

        assert!(store.get("anything").await.unwrap().is_none());
        store.remove("anything").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        let err = store.set("../escape", "{}".to_string()).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let temp_dir = TempDir::new().unwrap();
        FileKeyValueStore::new(temp_dir.path())
            .set("generated-reports", "{}".to_string())
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path());
        assert_eq!(
            reopened.get("generated-reports").await.unwrap().as_deref(),
            Some("{}")
        );
    }
}
