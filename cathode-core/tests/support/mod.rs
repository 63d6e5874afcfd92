//! In-memory fakes backing the pipeline integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cathode_core::database::ports::{
    CatalogRepository, ProviderRepository, UserDataRepository,
};
use cathode_core::error::{Result, SyncError};
use cathode_core::source::{CatalogSource, SourceError};
use cathode_model::{
    ContentKind, EpgEntry, EpgProgram, Episode, EpisodeId, EpisodeListing,
    Movie, MovieId, MovieListing, Provider, ProviderId, ProviderKind,
    ProviderSyncStats, Season, SeasonId, SeasonListing, Series, SeriesId,
    SeriesListing, SyncStatus,
};

// --- fixtures ---------------------------------------------------------------

pub fn provider_fixture() -> Provider {
    let now = Utc::now();
    Provider {
        id: ProviderId::new(),
        name: "Test Portal".into(),
        base_url: "http://upstream.test/".into(),
        kind: ProviderKind::TagCatalog,
        sync_status: SyncStatus::Idle,
        movies_synced_at: None,
        series_synced_at: None,
        animes_synced_at: None,
        epg_synced_at: None,
        movies_count: 0,
        series_count: 0,
        animes_count: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn movie_listing(index: u32) -> MovieListing {
    MovieListing {
        stream_key: format!("stream-{index}"),
        name: format!("movie.{index}.file"),
        title: Some(format!("Movie {index}")),
        year: Some(2000 + index as i32 % 25),
        container_extension: Some("mkv".into()),
        source_path: format!("/vod/{index}.mkv"),
    }
}

pub fn episode_listing(number: i32) -> EpisodeListing {
    EpisodeListing {
        episode_key: format!("ep-{number}"),
        number,
        title: Some(format!("Episode {number}")),
        name: None,
        container_extension: Some("mkv".into()),
        source_path: format!("/eps/{number}.mkv"),
    }
}

pub fn series_listing(key: &str, episodes_per_season: &[i32]) -> SeriesListing {
    let seasons: Vec<SeasonListing> = episodes_per_season
        .iter()
        .enumerate()
        .map(|(season_index, count)| SeasonListing {
            number: season_index as i32 + 1,
            name: Some(format!("Season {}", season_index + 1)),
            episode_count: *count,
            episodes: (1..=*count).map(episode_listing).collect(),
        })
        .collect();
    SeriesListing {
        series_key: key.to_owned(),
        name: key.to_owned(),
        title: Some(format!("Show {key}")),
        year: Some(2015),
        season_count: seasons.len() as i32,
        episode_count: episodes_per_season.iter().sum::<i32>(),
        seasons,
    }
}

// --- provider repository ----------------------------------------------------

#[derive(Default)]
pub struct MemoryProviders {
    providers: Mutex<HashMap<Uuid, Provider>>,
}

impl MemoryProviders {
    pub fn with(provider: Provider) -> Self {
        let store = Self::default();
        store
            .providers
            .lock()
            .unwrap()
            .insert(provider.id.to_uuid(), provider);
        store
    }

    pub fn status_of(&self, id: ProviderId) -> SyncStatus {
        self.providers.lock().unwrap()[&id.to_uuid()].sync_status
    }

    pub fn snapshot(&self, id: ProviderId) -> Provider {
        self.providers.lock().unwrap()[&id.to_uuid()].clone()
    }
}

#[async_trait]
impl ProviderRepository for MemoryProviders {
    async fn get(&self, id: ProviderId) -> Result<Option<Provider>> {
        Ok(self.providers.lock().unwrap().get(&id.to_uuid()).cloned())
    }

    async fn list(&self) -> Result<Vec<Provider>> {
        Ok(self.providers.lock().unwrap().values().cloned().collect())
    }

    async fn set_sync_status(
        &self,
        id: ProviderId,
        status: SyncStatus,
    ) -> Result<()> {
        let mut providers = self.providers.lock().unwrap();
        let provider = providers
            .get_mut(&id.to_uuid())
            .ok_or_else(|| SyncError::NotFound(format!("provider {id}")))?;
        provider.sync_status = status;
        provider.updated_at = Utc::now();
        Ok(())
    }

    async fn record_sync_success(
        &self,
        id: ProviderId,
        stats: &ProviderSyncStats,
    ) -> Result<()> {
        let mut providers = self.providers.lock().unwrap();
        let provider = providers
            .get_mut(&id.to_uuid())
            .ok_or_else(|| SyncError::NotFound(format!("provider {id}")))?;
        let now = Utc::now();
        provider.sync_status = SyncStatus::Completed;
        provider.movies_count = stats.movies as i64;
        provider.series_count = stats.series as i64;
        provider.animes_count = stats.animes as i64;
        provider.movies_synced_at = Some(now);
        provider.series_synced_at = Some(now);
        provider.animes_synced_at = Some(now);
        provider.updated_at = now;
        Ok(())
    }

    async fn record_epg_synced(&self, id: ProviderId) -> Result<()> {
        let mut providers = self.providers.lock().unwrap();
        if let Some(provider) = providers.get_mut(&id.to_uuid()) {
            provider.epg_synced_at = Some(Utc::now());
        }
        Ok(())
    }
}

// --- catalog repository -----------------------------------------------------

#[derive(Default)]
struct CatalogState {
    movies: HashMap<(Uuid, String), Movie>,
    series: HashMap<(Uuid, &'static str, String), Series>,
    seasons: HashMap<(Uuid, i32), Season>,
    episodes: HashMap<(Uuid, String), Episode>,
    epg: HashMap<(Uuid, String, DateTime<Utc>), EpgProgram>,
}

/// Upsert-by-natural-key store mirroring the Postgres repository semantics.
/// `poison_stream_key` injects a chunk-level write failure.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
    pub poison_stream_key: Option<String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poisoned(stream_key: impl Into<String>) -> Self {
        Self {
            state: Mutex::default(),
            poison_stream_key: Some(stream_key.into()),
        }
    }

    pub fn movie_count(&self) -> usize {
        self.state.lock().unwrap().movies.len()
    }

    pub fn movie(
        &self,
        provider_id: ProviderId,
        stream_key: &str,
    ) -> Option<Movie> {
        self.state
            .lock()
            .unwrap()
            .movies
            .get(&(provider_id.to_uuid(), stream_key.to_owned()))
            .cloned()
    }

    pub fn movie_ids(&self) -> HashSet<MovieId> {
        self.state
            .lock()
            .unwrap()
            .movies
            .values()
            .map(|movie| movie.id)
            .collect()
    }

    pub fn series_ids(&self) -> HashSet<SeriesId> {
        self.state
            .lock()
            .unwrap()
            .series
            .values()
            .map(|series| series.id)
            .collect()
    }

    pub fn episode_ids(&self) -> HashSet<EpisodeId> {
        self.state
            .lock()
            .unwrap()
            .episodes
            .values()
            .map(|episode| episode.id)
            .collect()
    }

    pub fn episode_count(&self) -> usize {
        self.state.lock().unwrap().episodes.len()
    }

    pub fn epg_count(&self) -> usize {
        self.state.lock().unwrap().epg.len()
    }

    pub fn all_series(&self) -> Vec<Series> {
        self.state.lock().unwrap().series.values().cloned().collect()
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn upsert_movies(
        &self,
        provider_id: ProviderId,
        listings: &[MovieListing],
    ) -> Result<u64> {
        if let Some(poison) = &self.poison_stream_key {
            if listings.iter().any(|l| &l.stream_key == poison) {
                return Err(SyncError::Internal(
                    "injected write failure".into(),
                ));
            }
        }

        let mut state = self.state.lock().unwrap();
        let mut seen = HashSet::new();
        let mut affected = 0u64;
        for listing in listings {
            if !seen.insert(listing.stream_key.clone()) {
                continue;
            }
            let key = (provider_id.to_uuid(), listing.stream_key.clone());
            let now = Utc::now();
            match state.movies.get_mut(&key) {
                Some(existing) => {
                    existing.title = listing.display_title().to_owned();
                    existing.year = listing.year;
                    existing.container_extension =
                        listing.container_extension.clone();
                    existing.source_path = listing.source_path.clone();
                    existing.updated_at = now;
                }
                None => {
                    state.movies.insert(
                        key,
                        Movie {
                            id: MovieId::new(),
                            provider_id,
                            stream_key: listing.stream_key.clone(),
                            title: listing.display_title().to_owned(),
                            year: listing.year,
                            container_extension: listing
                                .container_extension
                                .clone(),
                            source_path: listing.source_path.clone(),
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn find_series(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        series_key: &str,
    ) -> Result<Option<Series>> {
        let key =
            (provider_id.to_uuid(), kind.as_str(), series_key.to_owned());
        Ok(self.state.lock().unwrap().series.get(&key).cloned())
    }

    async fn insert_series(&self, series: &Series) -> Result<()> {
        let key = (
            series.provider_id.to_uuid(),
            series.kind.as_str(),
            series.series_key.clone(),
        );
        self.state.lock().unwrap().series.insert(key, series.clone());
        Ok(())
    }

    async fn update_series(&self, series: &Series) -> Result<()> {
        self.insert_series(series).await
    }

    async fn find_season(
        &self,
        series_id: SeriesId,
        number: i32,
    ) -> Result<Option<Season>> {
        let key = (series_id.to_uuid(), number);
        Ok(self.state.lock().unwrap().seasons.get(&key).cloned())
    }

    async fn insert_season(&self, season: &Season) -> Result<()> {
        let key = (season.series_id.to_uuid(), season.number);
        self.state.lock().unwrap().seasons.insert(key, season.clone());
        Ok(())
    }

    async fn update_season(&self, season: &Season) -> Result<()> {
        self.insert_season(season).await
    }

    async fn upsert_episodes(
        &self,
        season_id: SeasonId,
        listings: &[EpisodeListing],
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut seen = HashSet::new();
        let mut affected = 0u64;
        for listing in listings {
            if !seen.insert(listing.episode_key.clone()) {
                continue;
            }
            let key = (season_id.to_uuid(), listing.episode_key.clone());
            let now = Utc::now();
            match state.episodes.get_mut(&key) {
                Some(existing) => {
                    existing.number = listing.number;
                    existing.title = listing.display_title();
                    existing.container_extension =
                        listing.container_extension.clone();
                    existing.source_path = listing.source_path.clone();
                    existing.updated_at = now;
                }
                None => {
                    state.episodes.insert(
                        key,
                        Episode {
                            id: EpisodeId::new(),
                            season_id,
                            episode_key: listing.episode_key.clone(),
                            number: listing.number,
                            title: listing.display_title(),
                            container_extension: listing
                                .container_extension
                                .clone(),
                            source_path: listing.source_path.clone(),
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
            affected += 1;
        }
        Ok(affected)
    }

    async fn upsert_epg(
        &self,
        provider_id: ProviderId,
        channel_key: &str,
        entries: &[EpgEntry],
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut affected = 0u64;
        for entry in entries {
            let key = (
                provider_id.to_uuid(),
                channel_key.to_owned(),
                entry.start_time,
            );
            state.epg.insert(
                key,
                EpgProgram {
                    provider_id,
                    channel_key: channel_key.to_owned(),
                    title: entry.title.clone(),
                    description: entry.description.clone(),
                    start_time: entry.start_time,
                    end_time: entry.end_time,
                },
            );
            affected += 1;
        }
        Ok(affected)
    }

    async fn series_pending_details(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        only_missing: bool,
    ) -> Result<Vec<SeriesId>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<&Series> = state
            .series
            .values()
            .filter(|series| {
                series.provider_id == provider_id
                    && series.kind == kind
                    && (!only_missing || series.details_synced_at.is_none())
            })
            .collect();
        rows.sort_by_key(|series| series.created_at);
        Ok(rows.into_iter().map(|series| series.id).collect())
    }

    async fn series_by_ids(&self, ids: &[SeriesId]) -> Result<Vec<Series>> {
        let wanted: HashSet<Uuid> =
            ids.iter().map(|id| id.to_uuid()).collect();
        Ok(self
            .state
            .lock()
            .unwrap()
            .series
            .values()
            .filter(|series| wanted.contains(&series.id.to_uuid()))
            .cloned()
            .collect())
    }

    async fn mark_details_synced(&self, id: SeriesId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for series in state.series.values_mut() {
            if series.id == id {
                series.details_synced_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

// --- user data repository ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct UserRow {
    pub media_id: Uuid,
}

/// Rows reference the `live` id set; anything else is an orphan.
#[derive(Default)]
pub struct MemoryUserData {
    pub live: Mutex<HashSet<Uuid>>,
    pub favorites: Mutex<Vec<UserRow>>,
    pub watch_history: Mutex<Vec<UserRow>>,
}

impl MemoryUserData {
    pub fn favorites_len(&self) -> usize {
        self.favorites.lock().unwrap().len()
    }

    pub fn watch_history_len(&self) -> usize {
        self.watch_history.lock().unwrap().len()
    }
}

#[async_trait]
impl UserDataRepository for MemoryUserData {
    async fn remove_orphan_favorites(&self) -> Result<u64> {
        let live = self.live.lock().unwrap().clone();
        let mut rows = self.favorites.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| live.contains(&row.media_id));
        Ok((before - rows.len()) as u64)
    }

    async fn remove_orphan_watch_history(&self) -> Result<u64> {
        let live = self.live.lock().unwrap().clone();
        let mut rows = self.watch_history.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| live.contains(&row.media_id));
        Ok((before - rows.len()) as u64)
    }
}

// --- catalog source ---------------------------------------------------------

/// Canned upstream data with injectable failures per call site.
#[derive(Default)]
pub struct StaticSource {
    pub movies: Mutex<Vec<MovieListing>>,
    pub series: Mutex<Vec<SeriesListing>>,
    pub anime: Mutex<Vec<SeriesListing>>,
    pub details: Mutex<HashMap<String, SeriesListing>>,
    pub channels: Mutex<Vec<String>>,
    pub epg: Mutex<HashMap<String, Vec<EpgEntry>>>,
    pub fail_movies: AtomicBool,
    pub fail_series: AtomicBool,
    pub fail_anime: AtomicBool,
    pub failing_detail_keys: Mutex<HashSet<String>>,
}

impl StaticSource {
    fn unavailable(what: &str) -> SourceError {
        SourceError::Decode(format!("injected failure: {what}"))
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn fetch_movies(
        &self,
        _provider: &Provider,
    ) -> std::result::Result<Vec<MovieListing>, SourceError> {
        if self.fail_movies.load(Ordering::SeqCst) {
            return Err(Self::unavailable("movies"));
        }
        Ok(self.movies.lock().unwrap().clone())
    }

    async fn fetch_series(
        &self,
        _provider: &Provider,
        kind: ContentKind,
    ) -> std::result::Result<Vec<SeriesListing>, SourceError> {
        match kind {
            ContentKind::Series => {
                if self.fail_series.load(Ordering::SeqCst) {
                    return Err(Self::unavailable("series"));
                }
                Ok(self.series.lock().unwrap().clone())
            }
            ContentKind::Anime => {
                if self.fail_anime.load(Ordering::SeqCst) {
                    return Err(Self::unavailable("anime"));
                }
                Ok(self.anime.lock().unwrap().clone())
            }
            ContentKind::Movie => {
                Err(Self::unavailable("movie containers"))
            }
        }
    }

    async fn fetch_series_detail(
        &self,
        _provider: &Provider,
        _kind: ContentKind,
        series_key: &str,
    ) -> std::result::Result<SeriesListing, SourceError> {
        if self.failing_detail_keys.lock().unwrap().contains(series_key) {
            return Err(Self::unavailable(series_key));
        }
        self.details
            .lock()
            .unwrap()
            .get(series_key)
            .cloned()
            .ok_or_else(|| Self::unavailable("unknown series"))
    }

    async fn fetch_channels(
        &self,
        _provider: &Provider,
    ) -> std::result::Result<Vec<String>, SourceError> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn fetch_epg(
        &self,
        _provider: &Provider,
        channel_key: &str,
    ) -> std::result::Result<Vec<EpgEntry>, SourceError> {
        Ok(self
            .epg
            .lock()
            .unwrap()
            .get(channel_key)
            .cloned()
            .unwrap_or_default())
    }
}
