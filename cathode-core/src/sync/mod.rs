//! The provider content synchronization pipeline.

pub mod chunk;
pub mod cleanup;
pub mod config;
pub mod detail;
pub mod epg;
pub mod events;
pub mod job;
pub mod orchestrator;
pub mod queue;
pub mod reconciler;
pub mod retry;
pub mod runner;

pub use chunk::{ChunkReport, ChunkStats, process_in_chunks};
pub use cleanup::OrphanSweeper;
pub use config::SyncTuning;
pub use detail::SeriesDetailSyncer;
pub use epg::EpgSyncer;
pub use events::{SyncEvent, SyncEventBus};
pub use job::{EnqueueOptions, SyncJob};
pub use orchestrator::SyncOrchestrator;
pub use queue::{JobQueue, SyncContext, start_workers};
pub use reconciler::SeriesReconciler;
pub use retry::{RetryDecision, RetryPolicy, evaluate};
pub use runner::{RunReport, run_bounded};
