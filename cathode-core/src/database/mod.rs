pub mod ports;
pub mod repositories;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{Result, SyncError};

/// Open a connection pool against the configured Postgres instance.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    // Health check before anything starts depending on the pool.
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await?;

    info!(max_connections, "connected to Postgres");
    Ok(pool)
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    crate::MIGRATOR
        .run(pool)
        .await
        .map_err(|e| SyncError::Internal(format!("migration failed: {e}")))?;
    info!("database migrations applied");
    Ok(())
}
