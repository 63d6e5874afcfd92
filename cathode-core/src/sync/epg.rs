//! Per-channel EPG sync: the bounded fan-out user for program guides.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use cathode_model::ProviderId;

use crate::database::ports::{CatalogRepository, ProviderRepository};
use crate::error::{Result, SyncError};
use crate::source::CatalogSource;

use super::config::SyncTuning;
use super::job::SyncJob;
use super::retry::{RetryDecision, evaluate};
use super::runner::{RunReport, run_bounded};

#[derive(Debug)]
pub struct EpgBatchOutcome {
    pub report: RunReport<String>,
    pub decision: RetryDecision<String>,
}

/// Fetches program guides channel by channel and bulk-upserts the entries,
/// keyed by `(provider_id, channel_key, start_time)`.
#[derive(Clone)]
pub struct EpgSyncer {
    providers: Arc<dyn ProviderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    source: Arc<dyn CatalogSource>,
    tuning: SyncTuning,
}

impl fmt::Debug for EpgSyncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpgSyncer")
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

impl EpgSyncer {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        source: Arc<dyn CatalogSource>,
        tuning: SyncTuning,
    ) -> Self {
        Self {
            providers,
            catalog,
            source,
            tuning,
        }
    }

    /// Build the EPG batch job for all eligible channels of a provider.
    /// Returns `None` when the provider exposes no channels.
    pub async fn plan(
        &self,
        provider_id: ProviderId,
    ) -> Result<Option<SyncJob>> {
        let provider = self
            .providers
            .get(provider_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("provider {provider_id}"))
            })?;

        let channel_keys = self.source.fetch_channels(&provider).await?;
        if channel_keys.is_empty() {
            return Ok(None);
        }
        Ok(Some(SyncJob::EpgSync {
            provider_id,
            channel_keys,
            attempt: 1,
        }))
    }

    /// Run one EPG batch attempt over the given channels.
    pub async fn run_batch(
        &self,
        provider_id: ProviderId,
        channel_keys: Vec<String>,
        attempt: u16,
    ) -> Result<EpgBatchOutcome> {
        let provider = self
            .providers
            .get(provider_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("provider {provider_id}"))
            })?;
        let provider = Arc::new(provider);

        let op = {
            let source = Arc::clone(&self.source);
            let catalog = Arc::clone(&self.catalog);
            let provider = Arc::clone(&provider);
            move |channel_key: String| {
                let source = Arc::clone(&source);
                let catalog = Arc::clone(&catalog);
                let provider = Arc::clone(&provider);
                async move {
                    let entries =
                        source.fetch_epg(&provider, &channel_key).await?;
                    catalog
                        .upsert_epg(provider.id, &channel_key, &entries)
                        .await?;
                    Ok(())
                }
            }
        };

        let report = run_bounded(
            channel_keys,
            self.tuning.detail_concurrency,
            self.tuning.detail_timeout(),
            |channel| channel.clone(),
            op,
        )
        .await;

        let decision = evaluate(
            &self.tuning.retry_policy(),
            attempt,
            report.total(),
            report.failed_keys.clone(),
        );

        if matches!(decision, RetryDecision::Done) {
            self.providers.record_epg_synced(provider_id).await?;
        }

        info!(
            %provider_id,
            attempt,
            succeeded = report.succeeded,
            failed = report.failed,
            "epg batch finished"
        );
        Ok(EpgBatchOutcome { report, decision })
    }
}
