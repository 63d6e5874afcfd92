//! # Cathode Core
//!
//! The provider content synchronization pipeline behind the Cathode
//! streaming portal: background workers and sync modules that reconcile
//! externally-scraped catalog data (movies, series, seasons, episodes, EPG
//! program guides, anime releases) into the local Postgres store.
//!
//! The pipeline is built from a small set of composable pieces:
//!
//! - bulk natural-key upserts ([`database::repositories`]) that keep re-syncs
//!   idempotent and surrogate ids stable,
//! - a hierarchical reconciler ([`sync::reconciler`]) that walks
//!   series -> season -> episode trees,
//! - a chunking batch processor ([`sync::chunk`]) that isolates chunk
//!   failures,
//! - a bounded-concurrency task runner ([`sync::runner`]) for per-item
//!   detail and EPG fetches,
//! - an adaptive retry scheduler ([`sync::retry`]) that distinguishes bad
//!   items from a bad upstream,
//! - the per-provider orchestrator ([`sync::orchestrator`]) and the orphan
//!   cleanup sweeper ([`sync::cleanup`]).

pub mod database;
pub mod error;
pub mod source;
pub mod sync;

pub use error::{Result, SyncError};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
