use thiserror::Error;

use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("upstream source error: {0}")]
    Source(#[from] SourceError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
