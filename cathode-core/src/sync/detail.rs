//! Per-series detail sync: the bounded fan-out user for series trees.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use cathode_model::{ContentKind, ProviderId, Series, SeriesId};

use crate::database::ports::{CatalogRepository, ProviderRepository};
use crate::error::{Result, SyncError};
use crate::source::CatalogSource;

use super::config::SyncTuning;
use super::reconciler::SeriesReconciler;
use super::retry::{RetryDecision, evaluate};
use super::runner::{RunReport, run_bounded};

/// Outcome of one detail batch attempt: the raw fan-out report plus the
/// retry decision the dispatcher acts on.
#[derive(Debug)]
pub struct DetailBatchOutcome {
    pub report: RunReport<SeriesId>,
    pub decision: RetryDecision<SeriesId>,
}

/// Fetches and reconciles full season/episode trees for batches of series,
/// one upstream call per series, under the bounded-concurrency runner.
#[derive(Clone)]
pub struct SeriesDetailSyncer {
    providers: Arc<dyn ProviderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    source: Arc<dyn CatalogSource>,
    reconciler: SeriesReconciler,
    tuning: SyncTuning,
}

impl fmt::Debug for SeriesDetailSyncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesDetailSyncer")
            .field("tuning", &self.tuning)
            .finish_non_exhaustive()
    }
}

impl SeriesDetailSyncer {
    pub fn new(
        providers: Arc<dyn ProviderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        source: Arc<dyn CatalogSource>,
        tuning: SyncTuning,
    ) -> Self {
        let reconciler = SeriesReconciler::new(Arc::clone(&catalog));
        Self {
            providers,
            catalog,
            source,
            reconciler,
            tuning,
        }
    }

    /// Run one batch attempt. `attempt` is 1-based and carried by the job
    /// payload; the dispatcher re-enqueues according to the decision.
    pub async fn run_batch(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        series_ids: Vec<SeriesId>,
        attempt: u16,
    ) -> Result<DetailBatchOutcome> {
        let provider = self
            .providers
            .get(provider_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(format!("provider {provider_id}"))
            })?;

        let rows = self.catalog.series_by_ids(&series_ids).await?;
        if rows.len() < series_ids.len() {
            // Rows deleted since the batch was enqueued; nothing to retry.
            debug!(
                requested = series_ids.len(),
                found = rows.len(),
                "some series ids no longer resolve; skipping them"
            );
        }

        let provider = Arc::new(provider);
        let op = {
            let source = Arc::clone(&self.source);
            let catalog = Arc::clone(&self.catalog);
            let reconciler = self.reconciler.clone();
            let provider = Arc::clone(&provider);
            move |series: Series| {
                let source = Arc::clone(&source);
                let catalog = Arc::clone(&catalog);
                let reconciler = reconciler.clone();
                let provider = Arc::clone(&provider);
                async move {
                    let listing = source
                        .fetch_series_detail(
                            &provider,
                            kind,
                            &series.series_key,
                        )
                        .await?;
                    reconciler
                        .reconcile_series(provider.id, kind, &listing)
                        .await?;
                    catalog.mark_details_synced(series.id).await?;
                    Ok(())
                }
            }
        };

        let report = run_bounded(
            rows,
            self.tuning.detail_concurrency,
            self.tuning.detail_timeout(),
            |series| series.id,
            op,
        )
        .await;

        let decision = evaluate(
            &self.tuning.retry_policy(),
            attempt,
            report.total(),
            report.failed_keys.clone(),
        );

        info!(
            %provider_id,
            %kind,
            attempt,
            succeeded = report.succeeded,
            failed = report.failed,
            "series detail batch finished"
        );
        Ok(DetailBatchOutcome { report, decision })
    }
}
