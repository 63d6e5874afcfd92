//! Upstream listing records.
//!
//! These are the structured shapes the catalog source contract returns.
//! Scraping and protocol quirks stay behind the source adapter; by the time a
//! record reaches the sync pipeline it looks like one of these.

use chrono::{DateTime, Utc};

/// One movie as listed by a provider catalog.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovieListing {
    pub stream_key: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub container_extension: Option<String>,
    pub source_path: String,
}

impl MovieListing {
    /// Preferred display title; some sources only fill `name`.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// One series or anime container with its nested season/episode tree.
///
/// Catalog listings may arrive with empty `seasons`; a later per-series
/// detail fetch fills the tree in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesListing {
    pub series_key: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub season_count: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode_count: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seasons: Vec<SeasonListing>,
}

impl SeriesListing {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// One season ("release" on drive-index providers) inside a series listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonListing {
    pub number: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode_count: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episodes: Vec<EpisodeListing>,
}

/// One episode inside a season listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeListing {
    pub episode_key: String,
    pub number: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub container_extension: Option<String>,
    pub source_path: String,
}

impl EpisodeListing {
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref() {
            return title.to_owned();
        }
        if let Some(name) = self.name.as_deref() {
            return name.to_owned();
        }
        format!("Episode {}", self.number)
    }
}

/// One program-guide entry for a channel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpgEntry {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_title_falls_back_to_number() {
        let listing = EpisodeListing {
            episode_key: "ep-9".into(),
            number: 9,
            title: None,
            name: None,
            container_extension: None,
            source_path: "/x/9.mkv".into(),
        };
        assert_eq!(listing.display_title(), "Episode 9");
    }

    #[test]
    fn movie_title_prefers_explicit_title() {
        let listing = MovieListing {
            stream_key: "m-1".into(),
            name: "raw.file.name.2019".into(),
            title: Some("Tidy Title".into()),
            year: Some(2019),
            container_extension: None,
            source_path: "/m/1".into(),
        };
        assert_eq!(listing.display_title(), "Tidy Title");
    }
}
