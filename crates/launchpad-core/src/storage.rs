//! Durable key-value storage contract.

use async_trait::async_trait;

use crate::error::Result;

/// String key-value storage used for persisted pipeline records.
///
/// Backends may be unavailable (quota, permissions); callers treat write
/// failures as warnings rather than aborting generation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
