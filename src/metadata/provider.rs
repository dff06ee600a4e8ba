//! Adapter trait for catalog services.
//!
//! A lookup against any catalog is the same three steps: search by title for
//! an identifier, fetch the detail document for that identifier, and
//! normalize the document into a [`MediaRecord`]. Adding a catalog means
//! writing one new [`CatalogProvider`].

use async_trait::async_trait;
use mediabot_common::{MediaType, Result, Service};

use super::record::MediaRecord;

/// One external catalog (TMDB, TVDB, ...).
///
/// Providers are shared across lookup tasks behind an `Arc`.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// The service this provider talks to.
    fn service(&self) -> Service;

    /// The media type this provider answers for.
    fn media_type(&self) -> MediaType {
        self.service().media_type()
    }

    /// Returns `true` when the provider has credentials and can serve
    /// requests.
    fn is_available(&self) -> bool;

    /// Search by free-text title, returning the first result's identifier.
    ///
    /// `Ok(None)` means the catalog has no match; it is not an error.
    async fn search(&self, title: &str, year: Option<u16>, locale: &str)
        -> Result<Option<String>>;

    /// Fetch the full detail document for `id`, including cast.
    async fn fetch_detail(&self, id: &str, locale: &str) -> Result<serde_json::Value>;

    /// Convert a detail document into a [`MediaRecord`].
    fn normalize(&self, detail: serde_json::Value) -> Result<MediaRecord>;
}
