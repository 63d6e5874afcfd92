//! # Cathode Worker
//!
//! The background sync daemon for the Cathode streaming portal. Boots the
//! database pool, runs migrations, starts the job worker pool and the
//! orphan-cleanup schedule, then feeds provider sync jobs into the queue
//! until shut down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use cathode_core::database::{
    self,
    ports::{CatalogRepository, ProviderRepository, UserDataRepository},
    repositories::{
        PostgresCatalogRepository, PostgresProviderRepository,
        PostgresUserDataRepository,
    },
};
use cathode_core::source::{CatalogSource, HttpCatalogSource};
use cathode_core::sync::{
    EpgSyncer, JobQueue, OrphanSweeper, SeriesDetailSyncer, SyncContext,
    SyncEventBus, SyncJob, SyncOrchestrator, SyncTuning, start_workers,
};
use cathode_model::{ProviderId, SyncStatus};

#[derive(Parser, Debug)]
#[command(
    name = "cathode-worker",
    about = "Cathode provider catalog sync worker"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "cathode.toml")]
    config: PathBuf,

    /// Mark this provider pending and enqueue a full sync at startup.
    #[arg(long)]
    sync_provider: Option<Uuid>,

    /// Enqueue one orphan-cleanup sweep at startup.
    #[arg(long)]
    sweep: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cathode_config::load(Some(args.config.as_path()))
        .context("loading configuration")?;

    let pool = database::connect(
        &config.database.url,
        config.database.max_connections,
    )
    .await
    .context("connecting to Postgres")?;
    database::run_migrations(&pool)
        .await
        .context("running migrations")?;

    let providers: Arc<dyn ProviderRepository> =
        Arc::new(PostgresProviderRepository::new(pool.clone()));
    let catalog: Arc<dyn CatalogRepository> =
        Arc::new(PostgresCatalogRepository::new(pool.clone()));
    let user_data: Arc<dyn UserDataRepository> =
        Arc::new(PostgresUserDataRepository::new(pool.clone()));
    let source: Arc<dyn CatalogSource> = Arc::new(
        HttpCatalogSource::new(
            Duration::from_secs(config.source.request_timeout_secs),
            &config.source.user_agent,
        )
        .context("building catalog source client")?,
    );

    let tuning = SyncTuning {
        chunk_size: config.sync.chunk_size,
        detail_concurrency: config.sync.detail_concurrency,
        detail_timeout_secs: config.sync.detail_timeout_secs,
        snooze_threshold: config.sync.snooze_threshold,
        retry_base_secs: config.sync.retry_base_secs,
        retry_max_secs: config.sync.retry_max_secs,
        max_attempts: config.sync.max_attempts,
        batch_size: config.sync.batch_size,
        delay_between_batches_secs: config.sync.delay_between_batches_secs,
    };

    let events = SyncEventBus::default();
    spawn_status_logger(&events);

    let sweeper = OrphanSweeper::new(Arc::clone(&user_data));
    let (queue, rx) = JobQueue::new(config.worker.queue_capacity);
    let ctx = Arc::new(SyncContext {
        orchestrator: SyncOrchestrator::new(
            Arc::clone(&providers),
            Arc::clone(&catalog),
            Arc::clone(&source),
            events.clone(),
            tuning.clone(),
        ),
        details: SeriesDetailSyncer::new(
            Arc::clone(&providers),
            Arc::clone(&catalog),
            Arc::clone(&source),
            tuning.clone(),
        ),
        epg: EpgSyncer::new(
            Arc::clone(&providers),
            Arc::clone(&catalog),
            Arc::clone(&source),
            tuning.clone(),
        ),
        sweeper: sweeper.clone(),
        queue: queue.clone(),
        enqueue_options: tuning.enqueue_defaults(),
    });

    let dispatcher = start_workers(rx, Arc::clone(&ctx), config.worker.count);
    let sweeper_handle = sweeper.spawn(Duration::from_secs(
        config.worker.cleanup_interval_secs,
    ));

    if let Some(raw_id) = args.sync_provider {
        let provider_id = ProviderId::from(raw_id);
        providers
            .set_sync_status(provider_id, SyncStatus::Pending)
            .await
            .context("marking provider pending")?;
        queue
            .enqueue(SyncJob::ProviderSync { provider_id })
            .await
            .context("enqueueing provider sync")?;
    }
    if args.sweep {
        queue
            .enqueue(SyncJob::OrphanSweep)
            .await
            .context("enqueueing orphan sweep")?;
    }

    // Pick up providers the portal already marked pending.
    for provider in providers.list().await.context("listing providers")? {
        if provider.sync_status == SyncStatus::Pending {
            info!(provider = %provider.name, "resuming pending sync");
            queue
                .enqueue(SyncJob::ProviderSync { provider_id: provider.id })
                .await
                .context("enqueueing pending provider sync")?;
        }
    }

    info!(
        workers = config.worker.count,
        queue_capacity = config.worker.queue_capacity,
        "cathode worker started"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received; stopping");
    sweeper_handle.abort();
    dispatcher.abort();
    Ok(())
}

fn spawn_status_logger(events: &SyncEventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => info!(
                    provider = %event.provider_id,
                    status = %event.status,
                    "sync status changed"
                ),
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "status event stream lagged");
                }
            }
        }
    });
}
