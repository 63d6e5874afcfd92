//! Hierarchical reconciliation of series/anime trees.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use cathode_model::{
    ContentKind, ProviderId, Season, SeasonId, SeasonListing, Series,
    SeriesId, SeriesListing,
};

use crate::database::ports::CatalogRepository;
use crate::error::Result;

use super::chunk::ChunkStats;

/// Walks one upstream container tree (series -> seasons -> episodes) and
/// reconciles each level against the store by natural key: find-or-create
/// the row, update mutable fields in place, and never touch a surrogate id.
///
/// Containers are reconciled one at a time rather than in one giant bulk
/// write: container-level isolation needs a per-entity boundary, while leaf
/// episodes can still go through the bulk upsert writer beneath each
/// reconciled season.
#[derive(Clone)]
pub struct SeriesReconciler {
    catalog: Arc<dyn CatalogRepository>,
}

impl fmt::Debug for SeriesReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesReconciler").finish_non_exhaustive()
    }
}

impl SeriesReconciler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Reconcile one container and its nested tree. Returns the total
    /// episode count processed beneath it.
    pub async fn reconcile_series(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        listing: &SeriesListing,
    ) -> Result<u64> {
        let series =
            self.reconcile_container(provider_id, kind, listing).await?;

        let mut episodes = 0u64;
        for season_listing in &listing.seasons {
            let season =
                self.reconcile_season(series.id, season_listing).await?;
            episodes += self
                .catalog
                .upsert_episodes(season.id, &season_listing.episodes)
                .await?;
        }

        debug!(
            series = %listing.series_key,
            %kind,
            episodes,
            "container reconciled"
        );
        Ok(episodes)
    }

    /// Reconcile a whole chunk of containers with per-container isolation:
    /// one malformed container is logged and skipped, its siblings still
    /// count.
    pub async fn reconcile_chunk(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        listings: Vec<SeriesListing>,
    ) -> ChunkStats {
        let mut stats = ChunkStats::default();
        for listing in &listings {
            match self.reconcile_series(provider_id, kind, listing).await {
                Ok(episodes) => {
                    stats.processed += 1;
                    stats.children += episodes;
                }
                Err(error) => {
                    warn!(
                        series = %listing.series_key,
                        %kind,
                        %error,
                        "container reconcile failed; skipping"
                    );
                }
            }
        }
        stats
    }

    async fn reconcile_container(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        listing: &SeriesListing,
    ) -> Result<Series> {
        match self
            .catalog
            .find_series(provider_id, kind, &listing.series_key)
            .await?
        {
            Some(mut existing) => {
                existing.title = listing.display_title().to_owned();
                existing.year = listing.year;
                existing.season_count = declared_season_count(listing);
                existing.episode_count = listing.episode_count;
                existing.updated_at = Utc::now();
                self.catalog.update_series(&existing).await?;
                Ok(existing)
            }
            None => {
                let now = Utc::now();
                let series = Series {
                    id: SeriesId::new(),
                    provider_id,
                    kind,
                    series_key: listing.series_key.clone(),
                    title: listing.display_title().to_owned(),
                    year: listing.year,
                    season_count: declared_season_count(listing),
                    episode_count: listing.episode_count,
                    details_synced_at: None,
                    created_at: now,
                    updated_at: now,
                };
                self.catalog.insert_series(&series).await?;
                Ok(series)
            }
        }
    }

    async fn reconcile_season(
        &self,
        series_id: SeriesId,
        listing: &SeasonListing,
    ) -> Result<Season> {
        match self.catalog.find_season(series_id, listing.number).await? {
            Some(mut existing) => {
                existing.name = listing.name.clone();
                existing.episode_count = declared_episode_count(listing);
                existing.updated_at = Utc::now();
                self.catalog.update_season(&existing).await?;
                Ok(existing)
            }
            None => {
                let now = Utc::now();
                let season = Season {
                    id: SeasonId::new(),
                    series_id,
                    number: listing.number,
                    name: listing.name.clone(),
                    episode_count: declared_episode_count(listing),
                    created_at: now,
                    updated_at: now,
                };
                self.catalog.insert_season(&season).await?;
                Ok(season)
            }
        }
    }
}

/// Some sources declare counts, some only ship the nested lists.
fn declared_season_count(listing: &SeriesListing) -> i32 {
    if listing.season_count > 0 {
        listing.season_count
    } else {
        listing.seasons.len() as i32
    }
}

fn declared_episode_count(listing: &SeasonListing) -> i32 {
    if listing.episode_count > 0 {
        listing.episode_count
    } else {
        listing.episodes.len() as i32
    }
}
