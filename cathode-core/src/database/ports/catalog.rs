use async_trait::async_trait;

use cathode_model::{
    ContentKind, EpgEntry, EpisodeListing, MovieListing, ProviderId, Season,
    SeasonId, Series, SeriesId,
};

use crate::error::Result;

/// Catalog persistence, written exclusively through upstream natural keys.
///
/// The bulk `upsert_*` operations are the batch upsert writer: one statement
/// per call, conflict resolution on the natural key, mutable display fields
/// replaced, surrogate id and creation timestamp left untouched. A constraint
/// violation aborts the whole call and surfaces as an error value; isolating
/// that failure to its chunk is the batch processor's responsibility.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Bulk-upsert movies keyed by `(provider_id, stream_key)`. Returns rows
    /// affected; empty input is a zero-count no-op.
    async fn upsert_movies(
        &self,
        provider_id: ProviderId,
        listings: &[MovieListing],
    ) -> Result<u64>;

    async fn find_series(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        series_key: &str,
    ) -> Result<Option<Series>>;

    async fn insert_series(&self, series: &Series) -> Result<()>;

    /// Update mutable fields of an existing container in place; the caller
    /// guarantees `series.id` already exists.
    async fn update_series(&self, series: &Series) -> Result<()>;

    async fn find_season(
        &self,
        series_id: SeriesId,
        number: i32,
    ) -> Result<Option<Season>>;

    async fn insert_season(&self, season: &Season) -> Result<()>;

    async fn update_season(&self, season: &Season) -> Result<()>;

    /// Bulk-upsert episodes keyed by `(season_id, episode_key)`.
    async fn upsert_episodes(
        &self,
        season_id: SeasonId,
        listings: &[EpisodeListing],
    ) -> Result<u64>;

    /// Bulk-upsert program-guide entries keyed by
    /// `(provider_id, channel_key, start_time)`.
    async fn upsert_epg(
        &self,
        provider_id: ProviderId,
        channel_key: &str,
        entries: &[EpgEntry],
    ) -> Result<u64>;

    /// Series ids eligible for a detail sync pass. With `only_missing`, only
    /// rows that have never completed a detail pass are returned.
    async fn series_pending_details(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        only_missing: bool,
    ) -> Result<Vec<SeriesId>>;

    async fn series_by_ids(&self, ids: &[SeriesId]) -> Result<Vec<Series>>;

    async fn mark_details_synced(&self, id: SeriesId) -> Result<()>;
}
