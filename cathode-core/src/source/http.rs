//! Thin reqwest adapter over the scraper service's JSON endpoints.
//!
//! Deliberately dumb: one GET per listing, no pagination, no caching. The
//! scraper service owns the actual provider protocols; this adapter only
//! maps its normalized JSON onto the listing records.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use async_trait::async_trait;
use cathode_model::{
    ContentKind, EpgEntry, MovieListing, Provider, ProviderKind,
    SeriesListing,
};

use super::{CatalogSource, SourceError};

#[derive(Clone, Debug)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(
        timeout: Duration,
        user_agent: &str,
    ) -> std::result::Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    fn endpoint(
        provider: &Provider,
        path: &str,
    ) -> std::result::Result<Url, SourceError> {
        let base = Url::parse(&provider.base_url).map_err(|e| {
            SourceError::Endpoint(format!(
                "provider {} base url {:?}: {e}",
                provider.name, provider.base_url
            ))
        })?;
        base.join(path).map_err(|e| {
            SourceError::Endpoint(format!("joining {path:?}: {e}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> std::result::Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Tag catalogs group content under tag paths; drive indexes publish
    /// flat JSON files per content kind.
    fn catalog_path(provider: &Provider, kind: ContentKind) -> &'static str {
        match (provider.kind, kind) {
            (ProviderKind::TagCatalog, ContentKind::Movie) => "catalog/movies",
            (ProviderKind::TagCatalog, ContentKind::Series) => "catalog/series",
            (ProviderKind::TagCatalog, ContentKind::Anime) => "catalog/anime",
            (ProviderKind::DriveIndex, ContentKind::Movie) => "index/movies.json",
            (ProviderKind::DriveIndex, ContentKind::Series) => "index/series.json",
            (ProviderKind::DriveIndex, ContentKind::Anime) => "index/releases.json",
        }
    }

    fn detail_path(
        provider: &Provider,
        kind: ContentKind,
        series_key: &str,
    ) -> String {
        format!(
            "{}/{}",
            Self::catalog_path(provider, kind),
            series_key
        )
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_movies(
        &self,
        provider: &Provider,
    ) -> std::result::Result<Vec<MovieListing>, SourceError> {
        let path = Self::catalog_path(provider, ContentKind::Movie);
        self.get_json(Self::endpoint(provider, path)?).await
    }

    async fn fetch_series(
        &self,
        provider: &Provider,
        kind: ContentKind,
    ) -> std::result::Result<Vec<SeriesListing>, SourceError> {
        let path = Self::catalog_path(provider, kind);
        self.get_json(Self::endpoint(provider, path)?).await
    }

    async fn fetch_series_detail(
        &self,
        provider: &Provider,
        kind: ContentKind,
        series_key: &str,
    ) -> std::result::Result<SeriesListing, SourceError> {
        let path = Self::detail_path(provider, kind, series_key);
        self.get_json(Self::endpoint(provider, &path)?).await
    }

    async fn fetch_channels(
        &self,
        provider: &Provider,
    ) -> std::result::Result<Vec<String>, SourceError> {
        self.get_json(Self::endpoint(provider, "epg/channels")?).await
    }

    async fn fetch_epg(
        &self,
        provider: &Provider,
        channel_key: &str,
    ) -> std::result::Result<Vec<EpgEntry>, SourceError> {
        let path = format!("epg/{channel_key}");
        self.get_json(Self::endpoint(provider, &path)?).await
    }
}
