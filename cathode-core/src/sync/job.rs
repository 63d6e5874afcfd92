use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cathode_model::{ContentKind, ProviderId, SeriesId};

/// Work items consumed by the sync worker pool.
///
/// All context a job needs (attempt counters, batch ids) travels in the
/// payload itself; nothing is read from ambient scheduler state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SyncJob {
    /// Full catalog sync for one provider.
    ProviderSync { provider_id: ProviderId },
    /// Per-series detail fetch for a batch of series ids.
    SeriesDetailBatch {
        provider_id: ProviderId,
        kind: ContentKind,
        series_ids: Vec<SeriesId>,
        attempt: u16,
    },
    /// EPG fetch for a batch of channels.
    EpgSync {
        provider_id: ProviderId,
        channel_keys: Vec<String>,
        attempt: u16,
    },
    /// Remove user-data rows whose content no longer exists.
    OrphanSweep,
}

impl SyncJob {
    pub fn name(&self) -> &'static str {
        match self {
            SyncJob::ProviderSync { .. } => "provider_sync",
            SyncJob::SeriesDetailBatch { .. } => "series_detail_batch",
            SyncJob::EpgSync { .. } => "epg_sync",
            SyncJob::OrphanSweep => "orphan_sweep",
        }
    }
}

impl fmt::Display for SyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncJob::ProviderSync { provider_id } => {
                write!(f, "provider_sync:{provider_id}")
            }
            SyncJob::SeriesDetailBatch {
                provider_id,
                kind,
                series_ids,
                attempt,
            } => write!(
                f,
                "series_detail_batch:{provider_id}:{kind}:{} items:attempt {attempt}",
                series_ids.len()
            ),
            SyncJob::EpgSync {
                provider_id,
                channel_keys,
                attempt,
            } => write!(
                f,
                "epg_sync:{provider_id}:{} channels:attempt {attempt}",
                channel_keys.len()
            ),
            SyncJob::OrphanSweep => write!(f, "orphan_sweep"),
        }
    }
}

/// Options controlling how detail batches are sliced and enqueued.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnqueueOptions {
    /// Items per job.
    pub batch_size: usize,
    /// Skip series that already completed a detail pass.
    pub only_missing: bool,
    /// Spacing between consecutive batch jobs (seconds).
    pub delay_between_batches_secs: u64,
}

impl Default for EnqueueOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            only_missing: true,
            delay_between_batches_secs: 5,
        }
    }
}

impl EnqueueOptions {
    pub fn delay_between_batches(&self) -> Duration {
        Duration::from_secs(self.delay_between_batches_secs)
    }
}
