//! Generation repository traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::model::{FinalReports, GenerationState};

/// Repository for the in-progress generation record.
///
/// Implementations only encode and decode. Staleness and catalog alignment
/// are decided by the state store.
#[async_trait]
pub trait GenerationStateRepository: Send + Sync {
    /// Loads the persisted record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(state))`: A record exists and could be decoded
    /// - `Ok(None)`: No record, or the record is corrupt
    /// - `Err(_)`: The backend itself failed
    async fn load(&self) -> Result<Option<GenerationState>>;

    /// Saves the full state, replacing any previous record.
    async fn save(&self, state: &GenerationState) -> Result<()>;

    /// Removes the record. Succeeds when there is nothing to remove.
    async fn clear(&self) -> Result<()>;
}

/// Repository for the final reports snapshot.
#[async_trait]
pub trait FinalReportsRepository: Send + Sync {
    async fn load(&self) -> Result<Option<FinalReports>>;

    async fn save(&self, reports: &FinalReports) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}
