//! Registry of configured [`CatalogProvider`]s, keyed by media type.

use std::sync::Arc;

use mediabot_common::{MediaType, Result, Service};

use super::provider::CatalogProvider;
use super::providers::{TmdbProvider, TvdbProvider};
use crate::config::ServicesConfig;

/// The set of catalog providers the fetcher can route to.
///
/// Each media type is served by at most one provider. Registering a second
/// provider for the same media type replaces the first.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use mediabot::metadata::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// registry.register(Arc::new(tmdb));
///
/// let provider = registry.for_media_type(MediaType::Movie);
/// ```
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn CatalogProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the TMDB movie provider and the TVDB series
    /// provider, configured from `services`.
    pub fn from_config(services: &ServicesConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(TmdbProvider::new(
            &services.resolve(Service::Tmdb),
        )?));
        registry.register(Arc::new(TvdbProvider::new(
            &services.resolve(Service::Tvdb),
        )?));
        Ok(registry)
    }

    /// Register a provider, replacing any provider for the same media type.
    pub fn register(&mut self, provider: Arc<dyn CatalogProvider>) {
        let media_type = provider.media_type();
        self.providers.retain(|p| p.media_type() != media_type);
        self.providers.push(provider);
    }

    /// The provider that answers for `media_type`, if one is registered.
    pub fn for_media_type(&self, media_type: MediaType) -> Option<Arc<dyn CatalogProvider>> {
        self.providers
            .iter()
            .find(|p| p.media_type() == media_type)
            .cloned()
    }

    /// Look up a provider by the service it talks to.
    pub fn get(&self, service: Service) -> Option<Arc<dyn CatalogProvider>> {
        self.providers
            .iter()
            .find(|p| p.service() == service)
            .cloned()
    }

    /// Services whose providers are configured and ready.
    pub fn available(&self) -> Vec<Service> {
        self.providers
            .iter()
            .filter(|p| p.is_available())
            .map(|p| p.service())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field(
                "services",
                &self.providers.iter().map(|p| p.service()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
