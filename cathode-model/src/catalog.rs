use chrono::{DateTime, Utc};

use crate::ids::{EpisodeId, MovieId, ProviderId, SeasonId, SeriesId};

/// Discriminates what a catalog row represents.
///
/// Series and anime share the same container table and reconciliation path;
/// the kind rides alongside the row so reconciliation is parameterized by it
/// instead of sniffing shapes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentKind {
    Movie,
    Series,
    Anime,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
            ContentKind::Anime => "anime",
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(ContentKind::Movie),
            "series" => Ok(ContentKind::Series),
            "anime" => Ok(ContentKind::Anime),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf movie row. Natural key: `(provider_id, stream_key)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Movie {
    pub id: MovieId,
    pub provider_id: ProviderId,
    /// Upstream stream identifier; stable across re-syncs.
    pub stream_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub container_extension: Option<String>,
    pub source_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Container row for series and anime. Natural key:
/// `(provider_id, kind, series_key)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    pub id: SeriesId,
    pub provider_id: ProviderId,
    pub kind: ContentKind,
    /// Upstream series identifier.
    pub series_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub season_count: i32,
    pub episode_count: i32,
    /// Set once a per-series detail sync has reconciled the full tree;
    /// `only_missing` enqueues skip rows where this is already set.
    pub details_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Season row ("release" on drive-index providers). Natural key:
/// `(series_id, number)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Season {
    pub id: SeasonId,
    pub series_id: SeriesId,
    pub number: i32,
    pub name: Option<String>,
    pub episode_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Leaf episode row. Natural key: `(season_id, episode_key)`; also unique by
/// `(season_id, number)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Episode {
    pub id: EpisodeId,
    pub season_id: SeasonId,
    /// Upstream episode identifier.
    pub episode_key: String,
    pub number: i32,
    pub title: String,
    pub container_extension: Option<String>,
    pub source_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One program-guide entry. Natural key:
/// `(provider_id, channel_key, start_time)`. Immutable once aired; upstream
/// can revise future entries, hence upsert-only writes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpgProgram {
    pub provider_id: ProviderId,
    pub channel_key: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
