use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cathode_model::{
    Provider, ProviderId, ProviderKind, ProviderSyncStats, SyncStatus,
};

use crate::database::ports::ProviderRepository;
use crate::error::{Result, SyncError};

const PROVIDER_COLUMNS: &str = "id, name, base_url, kind, sync_status, \
     movies_synced_at, series_synced_at, animes_synced_at, epg_synced_at, \
     movies_count, series_count, animes_count, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresProviderRepository {
    pool: PgPool,
}

impl PostgresProviderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    name: String,
    base_url: String,
    kind: String,
    sync_status: String,
    movies_synced_at: Option<DateTime<Utc>>,
    series_synced_at: Option<DateTime<Utc>>,
    animes_synced_at: Option<DateTime<Utc>>,
    epg_synced_at: Option<DateTime<Utc>>,
    movies_count: i64,
    series_count: i64,
    animes_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = SyncError;

    fn try_from(row: ProviderRow) -> Result<Self> {
        let kind = ProviderKind::from_str(&row.kind)
            .map_err(SyncError::Internal)?;
        let sync_status = SyncStatus::from_str(&row.sync_status)
            .map_err(SyncError::Internal)?;
        Ok(Provider {
            id: ProviderId::from(row.id),
            name: row.name,
            base_url: row.base_url,
            kind,
            sync_status,
            movies_synced_at: row.movies_synced_at,
            series_synced_at: row.series_synced_at,
            animes_synced_at: row.animes_synced_at,
            epg_synced_at: row.epg_synced_at,
            movies_count: row.movies_count,
            series_count: row.series_count,
            animes_count: row.animes_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ProviderRepository for PostgresProviderRepository {
    async fn get(&self, id: ProviderId) -> Result<Option<Provider>> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1"
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Provider::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Provider>> {
        let rows = sqlx::query_as::<_, ProviderRow>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Provider::try_from).collect()
    }

    async fn set_sync_status(
        &self,
        id: ProviderId,
        status: SyncStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE providers SET sync_status = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.to_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SyncError::NotFound(format!("provider {id}")));
        }
        Ok(())
    }

    async fn record_sync_success(
        &self,
        id: ProviderId,
        stats: &ProviderSyncStats,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE providers SET \
                 sync_status = 'completed', \
                 movies_count = $2, \
                 series_count = $3, \
                 animes_count = $4, \
                 movies_synced_at = NOW(), \
                 series_synced_at = NOW(), \
                 animes_synced_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.to_uuid())
        .bind(stats.movies as i64)
        .bind(stats.series as i64)
        .bind(stats.animes as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SyncError::NotFound(format!("provider {id}")));
        }
        Ok(())
    }

    async fn record_epg_synced(&self, id: ProviderId) -> Result<()> {
        sqlx::query(
            "UPDATE providers SET epg_synced_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.to_uuid())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
