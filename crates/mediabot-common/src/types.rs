//! Core type definitions for lookups.
//!
//! Enums serialize in lowercase so they read the same in configuration files,
//! webhook payloads and cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of media a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A feature film.
    Movie,
    /// A television series.
    Tv,
}

impl MediaType {
    /// All media types, in tag-matching order.
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Tv];

    /// The catalog service that answers lookups for this media type.
    pub fn service(self) -> Service {
        match self {
            Self::Movie => Service::Tmdb,
            Self::Tv => Service::Tvdb,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            other => Err(Error::validation(format!("unknown media type: {other}"))),
        }
    }
}

/// External catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// The Movie Database.
    Tmdb,
    /// TheTVDB.
    Tvdb,
}

impl Service {
    pub const ALL: [Service; 2] = [Service::Tmdb, Service::Tvdb];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tmdb => "tmdb",
            Self::Tvdb => "tvdb",
        }
    }

    /// The media type this service catalogs.
    pub fn media_type(self) -> MediaType {
        match self {
            Self::Tmdb => MediaType::Movie,
            Self::Tvdb => MediaType::Tv,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tmdb" => Ok(Self::Tmdb),
            "tvdb" => Ok(Self::Tvdb),
            other => Err(Error::validation(format!("unknown service: {other}"))),
        }
    }
}

/// Which syntax a title reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchForm {
    /// `!movie Title (Year)`
    Command,
    /// `[tv] Title (Year)`
    Bracket,
    /// Media type inferred from a `movie`/`tv` tag.
    Tag,
}

impl MatchForm {
    /// Whether the content carried an explicit inline command.
    pub fn is_command(self) -> bool {
        matches!(self, Self::Command)
    }
}

/// A single resolved lookup: what to search for, in which language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub media_type: MediaType,
    pub title: String,
    pub year: Option<u16>,
    pub locale: String,
}

impl LookupRequest {
    pub fn new(
        media_type: MediaType,
        title: impl Into<String>,
        year: Option<u16>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            media_type,
            title: title.into().trim().to_string(),
            year,
            locale: locale.into(),
        }
    }

    /// The catalog service this request is routed to.
    pub fn service(&self) -> Service {
        self.media_type.service()
    }

    /// Title case-folded and trimmed, as used for cache keys.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }
}
