//! Concrete catalog provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`CatalogProvider`](super::CatalogProvider) trait.

pub mod tmdb;
pub mod tvdb;

pub use tmdb::TmdbProvider;
pub use tvdb::TvdbProvider;

use std::time::Duration;

use mediabot_common::{Error, Result, Service};
use serde_json::Value;

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Build the HTTP client a provider uses for every call.
pub(crate) fn http_client(service: Service, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("mediabot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::configuration(format!("failed to build {service} HTTP client: {e}")))
}

/// Send `request` and decode a JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies all become
/// [`Error::Api`] for `service`.
pub(crate) async fn get_json(service: Service, request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::api(service.as_str(), format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::api_status(
            service.as_str(),
            status.as_u16(),
            error_summary(&body, status.canonical_reason()),
        ));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Error::api(service.as_str(), format!("invalid JSON response: {e}")))
}

/// Decode a detail document into a provider's private response type.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(service: Service, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::api(service.as_str(), format!("unexpected response shape: {e}")))
}

/// Render a JSON id (number or string) as a string.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn error_summary(body: &str, reason: Option<&str>) -> String {
    let body = body.trim();
    if body.is_empty() {
        return reason.unwrap_or("request failed").to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_accepts_numbers_and_strings() {
        assert_eq!(id_string(&json!(850165)), Some("850165".to_string()));
        assert_eq!(id_string(&json!(" 371980 ")), Some("371980".to_string()));
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&json!(null)), None);
    }

    #[test]
    fn error_summary_falls_back_to_reason() {
        assert_eq!(error_summary("  ", Some("Not Found")), "Not Found");
        assert_eq!(error_summary("", None), "request failed");
        assert_eq!(error_summary("bad key", Some("Unauthorized")), "bad key");
    }

    #[test]
    fn error_summary_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY + 50);
        let summary = error_summary(&body, None);
        assert_eq!(summary.len(), MAX_ERROR_BODY + 3);
        assert!(summary.ends_with("..."));
    }
}
