//! Provider id -> constructor lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use embedding::{
    EmbeddingError, EmbeddingProvider, EmbeddingService, ProviderConfig, ProviderId, Result,
};
use gemini_embedding::GeminiEmbedding;
use mistral_embedding::MistralEmbedding;
use native_embedding::{ModelCache, NativeEmbedding};
use openai_embedding::OpenAIEmbedding;
use tracing::debug;

/// Builds the backend for one provider from its config. Must not block or do I/O;
/// backends initialize lazily on first use.
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn EmbeddingService>> + Send + Sync>;

/// Fixed mapping from [`ProviderId`] to a [`ProviderFactory`]. No retry or fallback logic.
#[derive(Clone)]
pub struct ProviderRegistry {
    factories: BTreeMap<ProviderId, ProviderFactory>,
    native_models: Arc<ModelCache>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list_supported())
            .finish()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProviderRegistry {
    /// Registry with no providers.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
            native_models: Arc::new(ModelCache::new()),
        }
    }

    /// Registry with the built-in native, OpenAI, Gemini and Mistral backends.
    /// Native providers created from it share loaded models.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let models = registry.native_models.clone();
        registry
            .register(ProviderId::Native, move |config| {
                Ok(Arc::new(NativeEmbedding::from_config(config, &models)))
            })
            .register(ProviderId::OpenAi, |config| {
                Ok(Arc::new(OpenAIEmbedding::from_config(config)))
            })
            .register(ProviderId::Gemini, |config| {
                Ok(Arc::new(GeminiEmbedding::from_config(config)))
            })
            .register(ProviderId::Mistral, |config| {
                Ok(Arc::new(MistralEmbedding::from_config(config)))
            });
        registry
    }

    /// Adds or replaces the factory for `id`.
    pub fn register<F>(&mut self, id: ProviderId, factory: F) -> &mut Self
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn EmbeddingService>> + Send + Sync + 'static,
    {
        self.factories.insert(id, Arc::new(factory));
        self
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.factories.contains_key(&id)
    }

    /// Registered ids in declaration order of [`ProviderId`].
    pub fn list_supported(&self) -> Vec<ProviderId> {
        self.factories.keys().copied().collect()
    }

    /// Constructs the provider `config` names. Fails with `UnsupportedProvider` when the id
    /// is not registered and with `Config` when the config can never work. No network access.
    pub fn create(&self, config: &ProviderConfig) -> Result<EmbeddingProvider> {
        let factory = self
            .factories
            .get(&config.provider)
            .ok_or_else(|| EmbeddingError::UnsupportedProvider(config.provider.to_string()))?;
        config.validate()?;

        let service = factory(config)?;
        debug!(provider = %config.provider, model = %service.model(), "provider created");
        Ok(EmbeddingProvider::new(config.clone(), service))
    }

    /// Releases native model handles loaded through this registry.
    pub async fn release(&self) {
        self.native_models.release_all().await;
    }
}
