//! In-process job queue and worker pool.
//!
//! One bounded channel of [`SyncJob`] payloads, a dispatcher that admits
//! jobs under a worker-count semaphore, and per-job isolation: a job error
//! is logged and never takes the pool down. The retry scheduler's deferred
//! re-enqueues (snoozes and partial retries) go through
//! [`JobQueue::enqueue_after`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use cathode_model::{ContentKind, ProviderId, SeriesId};

use crate::error::{Result, SyncError};

use super::cleanup::OrphanSweeper;
use super::detail::SeriesDetailSyncer;
use super::epg::EpgSyncer;
use super::job::{EnqueueOptions, SyncJob};
use super::orchestrator::SyncOrchestrator;
use super::retry::RetryDecision;

/// Cloneable producer handle for the job channel.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<SyncJob>,
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("capacity", &self.tx.max_capacity())
            .finish()
    }
}

impl JobQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SyncJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub async fn enqueue(&self, job: SyncJob) -> Result<()> {
        self.tx
            .send(job)
            .await
            .map_err(|_| SyncError::Internal("job queue closed".into()))
    }

    /// Fire-and-forget deferred enqueue. Used by the retry scheduler; a
    /// queue that closed while the delay elapsed just drops the job.
    pub fn enqueue_after(&self, job: SyncJob, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(job).await.is_err() {
                warn!("job queue closed; dropping deferred job");
            }
        });
    }
}

/// Everything a worker needs to execute any job kind.
pub struct SyncContext {
    pub orchestrator: SyncOrchestrator,
    pub details: SeriesDetailSyncer,
    pub epg: EpgSyncer,
    pub sweeper: OrphanSweeper,
    pub queue: JobQueue,
    pub enqueue_options: EnqueueOptions,
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("queue", &self.queue)
            .field("enqueue_options", &self.enqueue_options)
            .finish_non_exhaustive()
    }
}

/// Start the dispatcher: receive jobs and run each as its own task, with at
/// most `workers` jobs executing at once.
pub fn start_workers(
    mut rx: mpsc::Receiver<SyncJob>,
    ctx: Arc<SyncContext>,
    workers: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let permits = Arc::new(Semaphore::new(workers.max(1)));
        while let Some(job) = rx.recv().await {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await
            else {
                break;
            };
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                let _permit = permit;
                debug!(job = %job, "job started");
                execute(&ctx, job).await;
            });
        }
        debug!("job queue closed; dispatcher exiting");
    })
}

async fn execute(ctx: &SyncContext, job: SyncJob) {
    match job {
        SyncJob::ProviderSync { provider_id } => {
            provider_sync(ctx, provider_id).await;
        }
        SyncJob::SeriesDetailBatch {
            provider_id,
            kind,
            series_ids,
            attempt,
        } => {
            detail_batch(ctx, provider_id, kind, series_ids, attempt).await;
        }
        SyncJob::EpgSync { provider_id, channel_keys, attempt } => {
            epg_batch(ctx, provider_id, channel_keys, attempt).await;
        }
        SyncJob::OrphanSweep => {
            if let Err(sweep_error) = ctx.sweeper.sweep().await {
                warn!(%sweep_error, "orphan sweep job failed");
            }
        }
    }
}

async fn provider_sync(ctx: &SyncContext, provider_id: ProviderId) {
    if let Err(sync_error) = ctx.orchestrator.sync_provider(provider_id).await
    {
        error!(%provider_id, %sync_error, "provider sync failed");
        return;
    }

    // Catalog landed; fan out the per-item follow-ups.
    let spacing = ctx.enqueue_options.delay_between_batches();
    for kind in [ContentKind::Series, ContentKind::Anime] {
        match ctx
            .orchestrator
            .plan_detail_batches(provider_id, kind, &ctx.enqueue_options)
            .await
        {
            Ok(jobs) => {
                info!(
                    %provider_id,
                    %kind,
                    batches = jobs.len(),
                    "detail batches enqueued"
                );
                for (index, job) in jobs.into_iter().enumerate() {
                    ctx.queue.enqueue_after(job, spacing * index as u32);
                }
            }
            Err(plan_error) => warn!(
                %provider_id,
                %kind,
                %plan_error,
                "could not plan detail batches"
            ),
        }
    }

    match ctx.epg.plan(provider_id).await {
        Ok(Some(job)) => ctx.queue.enqueue_after(job, Duration::ZERO),
        Ok(None) => debug!(%provider_id, "no channels eligible for epg sync"),
        Err(plan_error) => {
            warn!(%provider_id, %plan_error, "could not plan epg sync")
        }
    }
}

async fn detail_batch(
    ctx: &SyncContext,
    provider_id: ProviderId,
    kind: ContentKind,
    series_ids: Vec<SeriesId>,
    attempt: u16,
) {
    let original = series_ids.clone();
    let outcome = match ctx
        .details
        .run_batch(provider_id, kind, series_ids, attempt)
        .await
    {
        Ok(outcome) => outcome,
        Err(batch_error) => {
            error!(%provider_id, %kind, %batch_error, "detail batch failed");
            return;
        }
    };

    match outcome.decision {
        RetryDecision::Done => {}
        RetryDecision::Exhausted => warn!(
            %provider_id,
            %kind,
            attempt,
            failed = outcome.report.failed,
            "detail batch retry budget exhausted; dropping"
        ),
        RetryDecision::Snooze { delay } => {
            // Systemic condition: the whole original batch goes back,
            // succeeded items included (upserts keep that safe).
            ctx.queue.enqueue_after(
                SyncJob::SeriesDetailBatch {
                    provider_id,
                    kind,
                    series_ids: original,
                    attempt: attempt + 1,
                },
                delay,
            );
        }
        RetryDecision::Retry { failed, delay } => {
            ctx.queue.enqueue_after(
                SyncJob::SeriesDetailBatch {
                    provider_id,
                    kind,
                    series_ids: failed,
                    attempt: attempt + 1,
                },
                delay,
            );
        }
    }
}

async fn epg_batch(
    ctx: &SyncContext,
    provider_id: ProviderId,
    channel_keys: Vec<String>,
    attempt: u16,
) {
    let original = channel_keys.clone();
    let outcome = match ctx
        .epg
        .run_batch(provider_id, channel_keys, attempt)
        .await
    {
        Ok(outcome) => outcome,
        Err(batch_error) => {
            error!(%provider_id, %batch_error, "epg batch failed");
            return;
        }
    };

    match outcome.decision {
        RetryDecision::Done => {}
        RetryDecision::Exhausted => warn!(
            %provider_id,
            attempt,
            failed = outcome.report.failed,
            "epg batch retry budget exhausted; dropping"
        ),
        RetryDecision::Snooze { delay } => {
            ctx.queue.enqueue_after(
                SyncJob::EpgSync {
                    provider_id,
                    channel_keys: original,
                    attempt: attempt + 1,
                },
                delay,
            );
        }
        RetryDecision::Retry { failed, delay } => {
            ctx.queue.enqueue_after(
                SyncJob::EpgSync {
                    provider_id,
                    channel_keys: failed,
                    attempt: attempt + 1,
                },
                delay,
            );
        }
    }
}
