//! Normalized media records.
//!
//! Each catalog returns its own JSON shape. Providers normalize those shapes
//! into [`MovieRecord`] or [`ShowRecord`], wrapped in [`MediaRecord`]. The
//! formatter reads records through [`RecordView`], so movie and show share a
//! single rendering path.

use mediabot_common::MediaType;
use serde::{Deserialize, Serialize};

const TMDB_WEB_BASE: &str = "https://www.themoviedb.org/movie";
const TVDB_WEB_BASE: &str = "https://thetvdb.com/series";

/// A credited performer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    /// Character played, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl CastMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
        }
    }
}

/// A film as described by the movie catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub release_year: Option<u16>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
}

/// A series as described by the TV catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub first_aired: Option<String>,
    #[serde(default)]
    pub first_aired_year: Option<u16>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub characters: Vec<CastMember>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
}

/// A catalog entry of either kind. Cached and rendered as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaRecord {
    Movie(MovieRecord),
    Show(ShowRecord),
}

/// Borrowed, kind-agnostic view over a [`MediaRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordView<'a> {
    pub media_type: MediaType,
    pub title: &'a str,
    pub year: Option<u16>,
    /// Release date for movies, first-aired date for shows.
    pub date: Option<&'a str>,
    pub overview: Option<&'a str>,
    pub poster_url: Option<&'a str>,
    pub cast: &'a [CastMember],
    pub rating: Option<f64>,
    pub genres: &'a [String],
    pub runtime_minutes: Option<u32>,
    pub external_id: &'a str,
}

impl MediaRecord {
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Movie(_) => MediaType::Movie,
            Self::Show(_) => MediaType::Tv,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Show(s) => &s.name,
        }
    }

    pub fn view(&self) -> RecordView<'_> {
        match self {
            Self::Movie(m) => RecordView {
                media_type: MediaType::Movie,
                title: &m.title,
                year: m.release_year,
                date: m.release_date.as_deref(),
                overview: m.overview.as_deref(),
                poster_url: m.poster_url.as_deref(),
                cast: &m.cast,
                rating: m.rating,
                genres: &m.genres,
                runtime_minutes: m.runtime_minutes,
                external_id: &m.external_id,
            },
            Self::Show(s) => RecordView {
                media_type: MediaType::Tv,
                title: &s.name,
                year: s.first_aired_year,
                date: s.first_aired.as_deref(),
                overview: s.overview.as_deref(),
                poster_url: s.poster_url.as_deref(),
                cast: &s.characters,
                rating: s.score,
                genres: &s.genres,
                runtime_minutes: s.runtime_minutes,
                external_id: &s.external_id,
            },
        }
    }

    /// Public catalog page for this entry.
    pub fn external_url(&self) -> String {
        match self {
            Self::Movie(m) => format!("{TMDB_WEB_BASE}/{}", m.external_id),
            Self::Show(s) => format!("{TVDB_WEB_BASE}/{}", s.external_id),
        }
    }
}

/// Extract a four-digit year from a date string like `"2023-04-15"`.
pub(crate) fn parse_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<u16>().ok())
}

/// Treat empty strings from upstream as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
