use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use cathode_model::{ProviderId, ProviderSyncStats, SyncStatus};

/// Status transition notification published after each orchestrator state
/// change. Fire-and-forget: the pipeline never blocks on or depends on
/// delivery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncEvent {
    pub provider_id: ProviderId,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProviderSyncStats>,
}

/// Lightweight in-process bus fanning sync status transitions out to
/// observers (the portal UI, log followers). Publishing with no subscribers
/// is a no-op.
#[derive(Clone)]
pub struct SyncEventBus {
    sender: broadcast::Sender<SyncEvent>,
    capacity: usize,
}

impl fmt::Debug for SyncEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl SyncEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: SyncEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
