//! TMDB (The Movie Database) catalog provider.
//!
//! Implements [`CatalogProvider`] for movies against the TMDB v3 REST API:
//! `GET /search/movie` for the identifier and `GET /movie/{id}` with
//! `append_to_response=credits` for the detail document, so cast arrives in
//! the same round trip.

use async_trait::async_trait;
use mediabot_common::{Error, Result, Service};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{decode, get_json, http_client, id_string};
use crate::config::ServiceSettings;
use crate::metadata::provider::CatalogProvider;
use crate::metadata::record::{non_empty, parse_year, CastMember, MediaRecord, MovieRecord};

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResult {
    id: Value,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    id: Value,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    credits: Option<TmdbCredits>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCastMember {
    name: String,
    character: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB movie provider.
///
/// # Examples
///
/// ```no_run
/// use mediabot::config::ServicesConfig;
/// use mediabot::metadata::providers::TmdbProvider;
/// use mediabot_common::Service;
///
/// let settings = ServicesConfig::default().resolve(Service::Tmdb);
/// let provider = TmdbProvider::new(&settings).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbProvider {
    /// Create a provider from resolved service settings.
    pub fn new(settings: &ServiceSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(Service::Tmdb, settings.timeout)?,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::configuration("TMDB API key is not configured"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Convert a TMDB image path fragment to a full URL.
fn image_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}{path}")
}

#[async_trait]
impl CatalogProvider for TmdbProvider {
    fn service(&self) -> Service {
        Service::Tmdb
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
        locale: &str,
    ) -> Result<Option<String>> {
        let api_key = self.api_key()?;
        let url = self.url("/search/movie");
        debug!(url = %url, title = %title, year = ?year, "TMDB search movie");

        let mut params = vec![
            ("api_key", api_key.to_string()),
            ("query", title.to_string()),
            ("language", locale.to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let body = get_json(Service::Tmdb, self.client.get(&url).query(&params)).await?;
        let response: TmdbSearchResponse = decode(Service::Tmdb, body)?;

        Ok(response
            .results
            .first()
            .and_then(|result| id_string(&result.id)))
    }

    async fn fetch_detail(&self, id: &str, locale: &str) -> Result<Value> {
        let api_key = self.api_key()?;
        let url = self.url(&format!("/movie/{id}"));
        debug!(url = %url, "TMDB get movie detail");

        let request = self.client.get(&url).query(&[
            ("api_key", api_key),
            ("append_to_response", "credits"),
            ("language", locale),
        ]);
        get_json(Service::Tmdb, request).await
    }

    fn normalize(&self, detail: Value) -> Result<MediaRecord> {
        let detail: TmdbMovieDetail = decode(Service::Tmdb, detail)?;
        let external_id = id_string(&detail.id)
            .ok_or_else(|| Error::api("tmdb", "movie detail has no id"))?;

        let release_date = non_empty(detail.release_date);
        let cast = detail
            .credits
            .map(|credits| credits.cast)
            .unwrap_or_default()
            .into_iter()
            .map(|member| CastMember {
                name: member.name,
                role: non_empty(member.character),
            })
            .collect();

        Ok(MediaRecord::Movie(MovieRecord {
            external_id,
            title: detail.title.unwrap_or_default(),
            release_year: parse_year(release_date.as_deref()),
            release_date,
            overview: non_empty(detail.overview),
            poster_url: non_empty(detail.poster_path).map(|p| image_url(&p)),
            cast,
            rating: detail.vote_average,
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            runtime_minutes: detail.runtime.filter(|r| *r > 0),
        }))
    }
}
