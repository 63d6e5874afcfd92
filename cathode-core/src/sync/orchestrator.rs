//! Top-level per-provider sync driver.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use cathode_model::{
    ContentKind, Provider, ProviderId, ProviderSyncStats, SyncStatus,
};

use crate::database::ports::{CatalogRepository, ProviderRepository};
use crate::error::{Result, SyncError};
use crate::source::CatalogSource;

use super::chunk::{ChunkStats, process_in_chunks};
use super::config::SyncTuning;
use super::events::{SyncEvent, SyncEventBus};
use super::job::{EnqueueOptions, SyncJob};
use super::reconciler::SeriesReconciler;

/// Sequences one provider's sync phases and owns its status transitions.
///
/// `idle -> syncing -> {completed | failed}`, with `pending` set by the
/// enqueuing caller before the worker picks the job up. Movie and series
/// phases are mandatory; the anime phase is best-effort and degrades to a
/// zero-count result. Phases of one provider run serially so status and
/// counter updates stay coherent; different providers sync concurrently
/// with no coordination beyond the store's uniqueness constraints.
#[derive(Clone)]
pub struct SyncOrchestrator {
    providers: Arc<dyn ProviderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    source: Arc<dyn CatalogSource>,
    reconciler: SeriesReconciler,
    events: SyncEventBus,
    tuning: SyncTuning,
}

impl fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("events", &self.events)
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

impl SyncOrchestrator {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        source: Arc<dyn CatalogSource>,
        events: SyncEventBus,
        tuning: SyncTuning,
    ) -> Self {
        let reconciler = SeriesReconciler::new(Arc::clone(&catalog));
        Self {
            providers,
            catalog,
            source,
            reconciler,
            events,
            tuning,
        }
    }

    /// Run the full catalog sync for one provider.
    pub async fn sync_provider(
        &self,
        provider_id: ProviderId,
    ) -> Result<ProviderSyncStats> {
        let provider = self
            .providers
            .get(provider_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("provider {provider_id}"))
            })?;
        if !provider.is_configured() {
            return Err(SyncError::NotConfigured(provider.name.clone()));
        }

        self.providers
            .set_sync_status(provider_id, SyncStatus::Syncing)
            .await?;
        self.publish(provider_id, SyncStatus::Syncing, None);
        info!(provider = %provider.name, "provider sync started");

        let mut stats = ProviderSyncStats::default();

        match self.sync_movies(&provider).await {
            Ok(count) => stats.movies = count,
            Err(error) => return self.fail(provider_id, error).await,
        }

        match self.sync_containers(&provider, ContentKind::Series).await {
            Ok((count, episodes)) => {
                stats.series = count;
                stats.series_episodes = episodes;
            }
            Err(error) => return self.fail(provider_id, error).await,
        }

        // Anime is best-effort: the failure is downgraded to a zero-count
        // result right here rather than failing the provider.
        match self.sync_containers(&provider, ContentKind::Anime).await {
            Ok((count, episodes)) => {
                stats.animes = count;
                stats.anime_episodes = episodes;
            }
            Err(error) => {
                warn!(
                    provider = %provider.name,
                    %error,
                    "anime phase failed; recording zero anime counts"
                );
            }
        }

        self.providers
            .record_sync_success(provider_id, &stats)
            .await?;
        self.publish(provider_id, SyncStatus::Completed, Some(stats));
        info!(
            provider = %provider.name,
            movies = stats.movies,
            series = stats.series,
            series_episodes = stats.series_episodes,
            animes = stats.animes,
            anime_episodes = stats.anime_episodes,
            "provider sync completed"
        );
        Ok(stats)
    }

    /// Slice the series needing a detail pass into batch jobs. The caller
    /// enqueues them with the configured spacing.
    pub async fn plan_detail_batches(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        options: &EnqueueOptions,
    ) -> Result<Vec<SyncJob>> {
        let ids = self
            .catalog
            .series_pending_details(provider_id, kind, options.only_missing)
            .await?;
        let batch_size = options.batch_size.max(1);

        Ok(ids
            .chunks(batch_size)
            .map(|batch| SyncJob::SeriesDetailBatch {
                provider_id,
                kind,
                series_ids: batch.to_vec(),
                attempt: 1,
            })
            .collect())
    }

    async fn sync_movies(&self, provider: &Provider) -> Result<u64> {
        let listings = self.source.fetch_movies(provider).await?;
        info!(
            provider = %provider.name,
            listings = listings.len(),
            "movie catalog fetched"
        );

        let provider_id = provider.id;
        let report =
            process_in_chunks(listings, self.tuning.chunk_size, |chunk| {
                let catalog = Arc::clone(&self.catalog);
                async move {
                    let affected =
                        catalog.upsert_movies(provider_id, &chunk).await?;
                    Ok(ChunkStats::items(affected))
                }
            })
            .await;

        if report.failed_chunks > 0 {
            warn!(
                provider = %provider.name,
                failed_chunks = report.failed_chunks,
                "movie sync completed with failed chunks"
            );
        }
        Ok(report.processed)
    }

    async fn sync_containers(
        &self,
        provider: &Provider,
        kind: ContentKind,
    ) -> Result<(u64, u64)> {
        let listings = self.source.fetch_series(provider, kind).await?;
        info!(
            provider = %provider.name,
            %kind,
            listings = listings.len(),
            "container catalog fetched"
        );

        let provider_id = provider.id;
        let report =
            process_in_chunks(listings, self.tuning.chunk_size, |chunk| {
                let reconciler = self.reconciler.clone();
                async move {
                    Ok(reconciler
                        .reconcile_chunk(provider_id, kind, chunk)
                        .await)
                }
            })
            .await;

        Ok((report.processed, report.children))
    }

    async fn fail(
        &self,
        provider_id: ProviderId,
        error: SyncError,
    ) -> Result<ProviderSyncStats> {
        if let Err(status_error) = self
            .providers
            .set_sync_status(provider_id, SyncStatus::Failed)
            .await
        {
            warn!(
                %provider_id,
                %status_error,
                "could not record failed sync status"
            );
        }
        self.publish(provider_id, SyncStatus::Failed, None);
        Err(error)
    }

    fn publish(
        &self,
        provider_id: ProviderId,
        status: SyncStatus,
        stats: Option<ProviderSyncStats>,
    ) {
        self.events.publish(SyncEvent { provider_id, status, stats });
    }
}
