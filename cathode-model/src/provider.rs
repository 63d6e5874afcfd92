use chrono::{DateTime, Utc};

use crate::ids::ProviderId;

/// How a provider publishes its catalog.
///
/// Tag catalogs expose flat stream listings grouped by category tags; drive
/// index providers expose a browsable directory tree of releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ProviderKind {
    TagCatalog,
    DriveIndex,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::TagCatalog => "tag_catalog",
            ProviderKind::DriveIndex => "drive_index",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag_catalog" => Ok(ProviderKind::TagCatalog),
            "drive_index" => Ok(ProviderKind::DriveIndex),
            other => Err(format!("unknown provider kind: {other}")),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear provider sync lifecycle: `Idle -> Pending -> Syncing ->
/// {Completed | Failed}`. `Pending` is set by whoever enqueues the job;
/// everything after that is owned by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SyncStatus {
    Idle,
    Pending,
    Syncing,
    Completed,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Completed => "completed",
            SyncStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(SyncStatus::Idle),
            "pending" => Ok(SyncStatus::Pending),
            "syncing" => Ok(SyncStatus::Syncing),
            "completed" => Ok(SyncStatus::Completed),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream content source and its sync bookkeeping.
///
/// Providers are created by users (or bootstrap) and mutated by the sync
/// orchestrator only; the sync subsystem never deletes one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    /// Portal base URL for tag catalogs, index root for drive indexes.
    pub base_url: String,
    pub kind: ProviderKind,
    pub sync_status: SyncStatus,
    pub movies_synced_at: Option<DateTime<Utc>>,
    pub series_synced_at: Option<DateTime<Utc>>,
    pub animes_synced_at: Option<DateTime<Utc>>,
    pub epg_synced_at: Option<DateTime<Utc>>,
    pub movies_count: i64,
    pub series_count: i64,
    pub animes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// A provider with no base URL cannot be fetched from at all.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}
