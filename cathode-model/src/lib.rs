//! Shared data models for the Cathode sync engine.
//!
//! Everything a provider sync touches lives here: strongly typed surrogate
//! ids, the persisted provider/catalog rows, the upstream listing records the
//! source adapters deserialize, and the statistics aggregates the pipeline
//! reports. The crate is deliberately free of async and database concerns so
//! every layer (core, config, worker, tests) can depend on it.

pub mod catalog;
pub mod ids;
pub mod listings;
pub mod provider;
pub mod stats;

pub use catalog::{ContentKind, Episode, EpgProgram, Movie, Season, Series};
pub use ids::{EpisodeId, MovieId, ProviderId, SeasonId, SeriesId};
pub use listings::{
    EpgEntry, EpisodeListing, MovieListing, SeasonListing, SeriesListing,
};
pub use provider::{Provider, ProviderKind, SyncStatus};
pub use stats::{CleanupStats, ProviderSyncStats};
