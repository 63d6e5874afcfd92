use async_trait::async_trait;

use crate::error::Result;

/// The only user-data surface the sync engine owns: removing rows whose
/// referenced catalog content no longer exists. Everything else about
/// favorites and watch history belongs to the portal.
#[async_trait]
pub trait UserDataRepository: Send + Sync {
    /// Delete favorites whose media id no longer resolves. Returns rows
    /// removed; zero orphans is a no-op.
    async fn remove_orphan_favorites(&self) -> Result<u64>;

    /// Same sweep for watch-history rows.
    async fn remove_orphan_watch_history(&self) -> Result<u64>;
}
