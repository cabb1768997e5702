//! Generation repositories over a key-value store.
//!
//! Records are stored as JSON under fixed keys so any `KeyValueStore`
//! backend (file, memory) can hold them.

use async_trait::async_trait;
use launchpad_core::error::Result;
use launchpad_core::generation::{
    FinalReports, FinalReportsRepository, GenerationState, GenerationStateRepository,
};
use launchpad_core::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Key of the in-progress generation record.
pub const GENERATION_STATE_KEY: &str = "generation-state";
/// Key of the final reports snapshot.
pub const FINAL_REPORTS_KEY: &str = "generated-reports";

/// Decodes a stored record, treating corrupt data as absent.
fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                "[Repository] Ignoring unreadable record '{}': {}",
                key,
                e
            );
            None
        }
    }
}

/// Generation state repository backed by a `KeyValueStore`.
#[derive(Clone)]
pub struct KvGenerationStateRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvGenerationStateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, GENERATION_STATE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl GenerationStateRepository for KvGenerationStateRepository {
    async fn load(&self) -> Result<Option<GenerationState>> {
        let raw = self.store.get(&self.key).await?;
        Ok(decode(&self.key, raw))
    }

    async fn save(&self, state: &GenerationState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.store.set(&self.key, json).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }
}

/// Final reports repository backed by a `KeyValueStore`.
#[derive(Clone)]
pub struct KvFinalReportsRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvFinalReportsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: FINAL_REPORTS_KEY.to_string(),
        }
    }
}

#[async_trait]
impl FinalReportsRepository for KvFinalReportsRepository {
    async fn load(&self) -> Result<Option<FinalReports>> {
        let raw = self.store.get(&self.key).await?;
        Ok(decode(&self.key, raw))
    }

    async fn save(&self, reports: &FinalReports) -> Result<()> {
        let json = serde_json::to_string_pretty(reports)?;
        self.store.set(&self.key, json).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }
}
