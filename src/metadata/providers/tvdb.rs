//! TVDB catalog provider for series.
//!
//! Talks to the TVDB v4 API with the configured key as a bearer token.
//! Search results carry either a bare `tvdb_id` or a prefixed `id`
//! (`"series-371980"`); both are accepted.

use async_trait::async_trait;
use mediabot_common::{Error, Result, Service};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{decode, get_json, http_client, id_string};
use crate::config::ServiceSettings;
use crate::metadata::provider::CatalogProvider;
use crate::metadata::record::{non_empty, parse_year, CastMember, MediaRecord, ShowRecord};

const SERIES_ID_PREFIX: &str = "series-";

#[derive(Debug, Deserialize)]
struct TvdbEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TvdbSearchResult {
    tvdb_id: Option<Value>,
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvdbSeries {
    id: Value,
    name: Option<String>,
    first_aired: Option<String>,
    overview: Option<String>,
    image: Option<String>,
    #[serde(default)]
    characters: Vec<TvdbCharacter>,
    score: Option<f64>,
    #[serde(default)]
    genres: Vec<TvdbGenre>,
    #[serde(alias = "runtime")]
    average_runtime: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvdbCharacter {
    person_name: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TvdbGenre {
    Named { name: String },
    Plain(String),
}

impl TvdbGenre {
    fn into_name(self) -> String {
        match self {
            TvdbGenre::Named { name } | TvdbGenre::Plain(name) => name,
        }
    }
}

impl TvdbSearchResult {
    fn series_id(&self) -> Option<String> {
        if let Some(id) = self.tvdb_id.as_ref().and_then(id_string) {
            return Some(id);
        }
        let id = self.id.as_ref().and_then(id_string)?;
        Some(match id.strip_prefix(SERIES_ID_PREFIX) {
            Some(bare) => bare.to_string(),
            None => id,
        })
    }
}

/// TVDB series provider.
pub struct TvdbProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TvdbProvider {
    /// Create a provider from resolved service settings.
    pub fn new(settings: &ServiceSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(Service::Tvdb, settings.timeout)?,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::configuration("TVDB API key is not configured"))?;
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TVDB request");
        Ok(self.client.get(url).bearer_auth(api_key))
    }
}

#[async_trait]
impl CatalogProvider for TvdbProvider {
    fn service(&self) -> Service {
        Service::Tvdb
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
        let mut params = vec![
            ("query", title.to_string()),
            ("type", "series".to_string()),
            ("language", locale.to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let body = get_json(Service::Tvdb, self.get("/search")?.query(&params)).await?;
        let response: TvdbEnvelope<Vec<TvdbSearchResult>> = decode(Service::Tvdb, body)?;

        Ok(response
            .data
            .unwrap_or_default()
            .first()
            .and_then(TvdbSearchResult::series_id))
    }

    async fn fetch_detail(&self, id: &str, _locale: &str) -> Result<Value> {
        let body = get_json(Service::Tvdb, self.get(&format!("/series/{id}/extended"))?).await?;
        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(data) if !data.is_null() => Ok(data),
                _ => Err(Error::api("tvdb", "series detail has no data")),
            },
            _ => Err(Error::api("tvdb", "series detail is not an object")),
        }
    }

    fn normalize(&self, detail: Value) -> Result<MediaRecord> {
        let series: TvdbSeries = decode(Service::Tvdb, detail)?;
        let external_id =
            id_string(&series.id).ok_or_else(|| Error::api("tvdb", "series detail has no id"))?;

        let first_aired = non_empty(series.first_aired);
        let characters = series
            .characters
            .into_iter()
            .filter_map(|c| {
                let name = non_empty(c.person_name)?;
                Some(CastMember {
                    name,
                    role: non_empty(c.name),
                })
            })
            .collect();

        Ok(MediaRecord::Show(ShowRecord {
            external_id,
            name: series.name.unwrap_or_default(),
            first_aired_year: parse_year(first_aired.as_deref()),
            first_aired,
            overview: non_empty(series.overview),
            poster_url: non_empty(series.image),
            characters,
            score: series.score,
            genres: series.genres.into_iter().map(TvdbGenre::into_name).collect(),
            runtime_minutes: series.average_runtime.filter(|r| *r > 0),
        }))
    }
}
