use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use cathode_model::{
    ContentKind, EpgEntry, EpisodeListing, MovieListing, ProviderId, Season,
    SeasonId, Series, SeriesId,
};

use crate::database::ports::CatalogRepository;
use crate::error::{Result, SyncError};

const SERIES_COLUMNS: &str = "id, provider_id, kind, series_key, title, \
     year, season_count, episode_count, details_synced_at, created_at, \
     updated_at";

#[derive(Clone, Debug)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeriesRow {
    id: Uuid,
    provider_id: Uuid,
    kind: String,
    series_key: String,
    title: String,
    year: Option<i32>,
    season_count: i32,
    episode_count: i32,
    details_synced_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SeriesRow> for Series {
    type Error = SyncError;

    fn try_from(row: SeriesRow) -> Result<Self> {
        let kind =
            ContentKind::from_str(&row.kind).map_err(SyncError::Internal)?;
        Ok(Series {
            id: SeriesId::from(row.id),
            provider_id: ProviderId::from(row.provider_id),
            kind,
            series_key: row.series_key,
            title: row.title,
            year: row.year,
            season_count: row.season_count,
            episode_count: row.episode_count,
            details_synced_at: row.details_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SeasonRow {
    id: Uuid,
    series_id: Uuid,
    number: i32,
    name: Option<String>,
    episode_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SeasonRow> for Season {
    fn from(row: SeasonRow) -> Self {
        Season {
            id: SeasonId::from(row.id),
            series_id: SeriesId::from(row.series_id),
            number: row.number,
            name: row.name,
            episode_count: row.episode_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Drop later occurrences of a repeated natural key. A key appearing twice
/// in one INSERT would make `ON CONFLICT DO UPDATE` reject the statement
/// ("cannot affect row a second time"), aborting the entire chunk.
fn dedup_by_key<'a, T, K: std::hash::Hash + Eq>(
    items: &'a [T],
    key_of: impl Fn(&T) -> K,
) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key_of(item)))
        .collect()
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn upsert_movies(
        &self,
        provider_id: ProviderId,
        listings: &[MovieListing],
    ) -> Result<u64> {
        if listings.is_empty() {
            return Ok(0);
        }
        let listings = dedup_by_key(listings, |l| l.stream_key.clone());
        let now = Utc::now();

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO movies (id, provider_id, stream_key, title, year, \
             container_extension, source_path, created_at, updated_at) ",
        );
        builder.push_values(listings, |mut b, listing| {
            b.push_bind(Uuid::now_v7())
                .push_bind(provider_id.to_uuid())
                .push_bind(&listing.stream_key)
                .push_bind(listing.display_title())
                .push_bind(listing.year)
                .push_bind(&listing.container_extension)
                .push_bind(&listing.source_path)
                .push_bind(now)
                .push_bind(now);
        });
        builder.push(
            " ON CONFLICT (provider_id, stream_key) DO UPDATE SET \
                 title = EXCLUDED.title, \
                 year = EXCLUDED.year, \
                 container_extension = EXCLUDED.container_extension, \
                 source_path = EXCLUDED.source_path, \
                 updated_at = EXCLUDED.updated_at",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn find_series(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        series_key: &str,
    ) -> Result<Option<Series>> {
        let row = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series \
             WHERE provider_id = $1 AND kind = $2 AND series_key = $3"
        ))
        .bind(provider_id.to_uuid())
        .bind(kind.as_str())
        .bind(series_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Series::try_from).transpose()
    }

    async fn insert_series(&self, series: &Series) -> Result<()> {
        sqlx::query(
            "INSERT INTO series (id, provider_id, kind, series_key, title, \
             year, season_count, episode_count, details_synced_at, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(series.id.to_uuid())
        .bind(series.provider_id.to_uuid())
        .bind(series.kind.as_str())
        .bind(&series.series_key)
        .bind(&series.title)
        .bind(series.year)
        .bind(series.season_count)
        .bind(series.episode_count)
        .bind(series.details_synced_at)
        .bind(series.created_at)
        .bind(series.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_series(&self, series: &Series) -> Result<()> {
        // Natural key and surrogate id never move; only display fields do.
        sqlx::query(
            "UPDATE series SET title = $2, year = $3, season_count = $4, \
             episode_count = $5, updated_at = $6 \
             WHERE id = $1",
        )
        .bind(series.id.to_uuid())
        .bind(&series.title)
        .bind(series.year)
        .bind(series.season_count)
        .bind(series.episode_count)
        .bind(series.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_season(
        &self,
        series_id: SeriesId,
        number: i32,
    ) -> Result<Option<Season>> {
        let row = sqlx::query_as::<_, SeasonRow>(
            "SELECT id, series_id, number, name, episode_count, created_at, \
             updated_at FROM seasons \
             WHERE series_id = $1 AND number = $2",
        )
        .bind(series_id.to_uuid())
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Season::from))
    }

    async fn insert_season(&self, season: &Season) -> Result<()> {
        sqlx::query(
            "INSERT INTO seasons (id, series_id, number, name, \
             episode_count, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(season.id.to_uuid())
        .bind(season.series_id.to_uuid())
        .bind(season.number)
        .bind(&season.name)
        .bind(season.episode_count)
        .bind(season.created_at)
        .bind(season.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_season(&self, season: &Season) -> Result<()> {
        sqlx::query(
            "UPDATE seasons SET name = $2, episode_count = $3, \
             updated_at = $4 WHERE id = $1",
        )
        .bind(season.id.to_uuid())
        .bind(&season.name)
        .bind(season.episode_count)
        .bind(season.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_episodes(
        &self,
        season_id: SeasonId,
        listings: &[EpisodeListing],
    ) -> Result<u64> {
        if listings.is_empty() {
            return Ok(0);
        }
        let listings = dedup_by_key(listings, |l| l.episode_key.clone());
        let now = Utc::now();

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO episodes (id, season_id, episode_key, number, \
             title, container_extension, source_path, created_at, \
             updated_at) ",
        );
        builder.push_values(listings, |mut b, listing| {
            b.push_bind(Uuid::now_v7())
                .push_bind(season_id.to_uuid())
                .push_bind(&listing.episode_key)
                .push_bind(listing.number)
                .push_bind(listing.display_title())
                .push_bind(&listing.container_extension)
                .push_bind(&listing.source_path)
                .push_bind(now)
                .push_bind(now);
        });
        builder.push(
            " ON CONFLICT (season_id, episode_key) DO UPDATE SET \
                 number = EXCLUDED.number, \
                 title = EXCLUDED.title, \
                 container_extension = EXCLUDED.container_extension, \
                 source_path = EXCLUDED.source_path, \
                 updated_at = EXCLUDED.updated_at",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn upsert_epg(
        &self,
        provider_id: ProviderId,
        channel_key: &str,
        entries: &[EpgEntry],
    ) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let entries = dedup_by_key(entries, |e| e.start_time);
        let now = Utc::now();

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO epg_programs (provider_id, channel_key, title, \
             description, start_time, end_time, created_at, updated_at) ",
        );
        builder.push_values(entries, |mut b, entry| {
            b.push_bind(provider_id.to_uuid())
                .push_bind(channel_key)
                .push_bind(&entry.title)
                .push_bind(&entry.description)
                .push_bind(entry.start_time)
                .push_bind(entry.end_time)
                .push_bind(now)
                .push_bind(now);
        });
        builder.push(
            " ON CONFLICT (provider_id, channel_key, start_time) DO UPDATE \
             SET title = EXCLUDED.title, \
                 description = EXCLUDED.description, \
                 end_time = EXCLUDED.end_time, \
                 updated_at = EXCLUDED.updated_at",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn series_pending_details(
        &self,
        provider_id: ProviderId,
        kind: ContentKind,
        only_missing: bool,
    ) -> Result<Vec<SeriesId>> {
        let sql = if only_missing {
            "SELECT id FROM series \
             WHERE provider_id = $1 AND kind = $2 \
               AND details_synced_at IS NULL \
             ORDER BY created_at"
        } else {
            "SELECT id FROM series \
             WHERE provider_id = $1 AND kind = $2 \
             ORDER BY created_at"
        };

        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .bind(provider_id.to_uuid())
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(SeriesId::from).collect())
    }

    async fn series_by_ids(&self, ids: &[SeriesId]) -> Result<Vec<Series>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.to_uuid()).collect();

        let rows = sqlx::query_as::<_, SeriesRow>(&format!(
            "SELECT {SERIES_COLUMNS} FROM series WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Series::try_from).collect()
    }

    async fn mark_details_synced(&self, id: SeriesId) -> Result<()> {
        sqlx::query(
            "UPDATE series SET details_synced_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id.to_uuid())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
