//! Upstream catalog source contract.
//!
//! The sync pipeline consumes structured listings and nothing else; whatever
//! scraping or protocol work a provider kind requires happens behind
//! [`CatalogSource`]. The pipeline treats the source as unreliable by
//! construction: every call can fail or hang, and the batching/retry layers
//! above are what turn that into forward progress.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use cathode_model::{
    ContentKind, EpgEntry, MovieListing, Provider, SeriesListing,
};

pub use http::HttpCatalogSource;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    #[error("malformed listing payload: {0}")]
    Decode(String),
}

/// Structured access to one provider's catalog.
///
/// Catalog fetches (`fetch_movies`, `fetch_series`) return full listings in
/// one call; `fetch_series_detail` and `fetch_epg` are the
/// one-call-per-item operations the bounded-concurrency runner fans out.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_movies(
        &self,
        provider: &Provider,
    ) -> std::result::Result<Vec<MovieListing>, SourceError>;

    /// Series or anime containers, depending on `kind`. Listings may arrive
    /// without season trees; those are filled in by detail fetches.
    async fn fetch_series(
        &self,
        provider: &Provider,
        kind: ContentKind,
    ) -> std::result::Result<Vec<SeriesListing>, SourceError>;

    /// The full season/episode tree for one series.
    async fn fetch_series_detail(
        &self,
        provider: &Provider,
        kind: ContentKind,
        series_key: &str,
    ) -> std::result::Result<SeriesListing, SourceError>;

    /// Channel keys eligible for EPG sync on this provider.
    async fn fetch_channels(
        &self,
        provider: &Provider,
    ) -> std::result::Result<Vec<String>, SourceError>;

    /// Program guide entries for one channel.
    async fn fetch_epg(
        &self,
        provider: &Provider,
        channel_key: &str,
    ) -> std::result::Result<Vec<EpgEntry>, SourceError>;
}
