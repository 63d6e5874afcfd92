//! Orphaned user-data cleanup.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use cathode_model::CleanupStats;

use crate::database::ports::UserDataRepository;
use crate::error::Result;

/// Removes favorites and watch-history rows whose referenced content no
/// longer exists. Runs decoupled from the sync path, on its own schedule
/// outside the worker pool, so it can never delay ingestion.
#[derive(Clone)]
pub struct OrphanSweeper {
    user_data: Arc<dyn UserDataRepository>,
}

impl fmt::Debug for OrphanSweeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrphanSweeper").finish_non_exhaustive()
    }
}

impl OrphanSweeper {
    pub fn new(user_data: Arc<dyn UserDataRepository>) -> Self {
        Self { user_data }
    }

    /// One sweep. Idempotent: with nothing orphaned this is a no-op.
    pub async fn sweep(&self) -> Result<CleanupStats> {
        let favorites = self.user_data.remove_orphan_favorites().await?;
        let watch_history =
            self.user_data.remove_orphan_watch_history().await?;

        let stats = CleanupStats { favorites, watch_history };
        if stats.is_noop() {
            debug!("orphan sweep found nothing to remove");
        } else {
            info!(
                favorites = stats.favorites,
                watch_history = stats.watch_history,
                "orphan sweep removed dangling user data"
            );
        }
        Ok(stats)
    }

    /// Drive sweeps on a fixed cadence. The first sweep runs immediately;
    /// a failed sweep is logged and retried at the next tick.
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(error) = self.sweep().await {
                    warn!(%error, "orphan sweep failed");
                }
            }
        })
    }
}
