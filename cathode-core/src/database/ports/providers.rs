use async_trait::async_trait;

use cathode_model::{Provider, ProviderId, ProviderSyncStats, SyncStatus};

use crate::error::Result;

#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn get(&self, id: ProviderId) -> Result<Option<Provider>>;

    async fn list(&self) -> Result<Vec<Provider>>;

    /// Move the provider through its sync lifecycle. Fails with `NotFound`
    /// when the provider row no longer exists.
    async fn set_sync_status(
        &self,
        id: ProviderId,
        status: SyncStatus,
    ) -> Result<()>;

    /// Terminal success transition: persists aggregated counts, stamps the
    /// per-kind synced-at timestamps, and marks the provider `completed`.
    async fn record_sync_success(
        &self,
        id: ProviderId,
        stats: &ProviderSyncStats,
    ) -> Result<()>;

    /// Stamp a completed EPG pass; EPG runs on its own cadence outside the
    /// main catalog sync.
    async fn record_epg_synced(&self, id: ProviderId) -> Result<()>;
}
