use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::ports::UserDataRepository;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresUserDataRepository {
    pool: PgPool,
}

impl PostgresUserDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Predicate matching rows whose media reference no longer resolves.
/// `media_kind` values mirror the portal's reference discriminator.
const ORPHAN_PREDICATE: &str = "\
    (media_kind = 'movie' AND NOT EXISTS \
        (SELECT 1 FROM movies m WHERE m.id = media_id)) \
    OR (media_kind = 'series' AND NOT EXISTS \
        (SELECT 1 FROM series s WHERE s.id = media_id)) \
    OR (media_kind = 'episode' AND NOT EXISTS \
        (SELECT 1 FROM episodes e WHERE e.id = media_id))";

#[async_trait]
impl UserDataRepository for PostgresUserDataRepository {
    async fn remove_orphan_favorites(&self) -> Result<u64> {
        let result = sqlx::query(&format!(
            "DELETE FROM favorites WHERE {ORPHAN_PREDICATE}"
        ))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn remove_orphan_watch_history(&self) -> Result<u64> {
        let result = sqlx::query(&format!(
            "DELETE FROM watch_history WHERE {ORPHAN_PREDICATE}"
        ))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
