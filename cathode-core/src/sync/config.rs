use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::job::EnqueueOptions;
use super::retry::RetryPolicy;

/// Knobs that tune the sync pipeline.
///
/// All fields carry defaults so deployments can adopt individual settings
/// without supplying a full payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTuning {
    /// Items per bulk-upsert chunk.
    pub chunk_size: usize,
    /// Concurrent per-item operations inside one detail/EPG batch.
    pub detail_concurrency: usize,
    /// Per-item timeout for detail/EPG operations (seconds).
    pub detail_timeout_secs: u64,
    /// Failure rate at or above which a whole batch is snoozed instead of
    /// retried item by item.
    pub snooze_threshold: f32,
    /// Base retry delay (seconds).
    pub retry_base_secs: u64,
    /// Ceiling on any computed retry delay (seconds).
    pub retry_max_secs: u64,
    /// Attempts before a batch is dropped.
    pub max_attempts: u16,
    /// Default items per enqueued detail batch.
    pub batch_size: usize,
    /// Default spacing between enqueued batches (seconds).
    pub delay_between_batches_secs: u64,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            detail_concurrency: 5,
            detail_timeout_secs: 30,
            snooze_threshold: 0.8,
            retry_base_secs: 5,
            retry_max_secs: 300,
            max_attempts: 5,
            batch_size: 50,
            delay_between_batches_secs: 5,
        }
    }
}

impl SyncTuning {
    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            failure_threshold: self.snooze_threshold,
            base_delay: Duration::from_secs(self.retry_base_secs),
            max_delay: Duration::from_secs(self.retry_max_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn enqueue_defaults(&self) -> EnqueueOptions {
        EnqueueOptions {
            batch_size: self.batch_size,
            only_missing: true,
            delay_between_batches_secs: self.delay_between_batches_secs,
        }
    }
}
