//! Registry and auto-selector bundled behind one handle.

use embedding::{
    EmbedRequest, EmbedResponse, EmbeddingConfig, EmbeddingError, EmbeddingProvider,
    EnvEmbeddingConfig, ProviderConfig, ProviderId, Result,
};

use crate::dispatch::dispatch;
use crate::registry::ProviderRegistry;
use crate::selector::AutoSelector;

/// Long-lived entry point for applications that embed repeatedly. Native models loaded
/// through it stay loaded until [`EmbeddingRouter::release`].
#[derive(Debug, Clone)]
pub struct EmbeddingRouter {
    registry: ProviderRegistry,
    selector: AutoSelector,
}

impl EmbeddingRouter {
    pub fn new(registry: ProviderRegistry, selector: AutoSelector) -> Self {
        Self { registry, selector }
    }

    /// Built-in providers with auto-selection candidates taken from `config`.
    pub fn from_config(config: &dyn EmbeddingConfig) -> Self {
        Self::new(
            ProviderRegistry::with_defaults(),
            AutoSelector::from_config(config),
        )
    }

    /// Built-in providers configured from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(&load_env_config()?))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &AutoSelector {
        &self.selector
    }

    /// Direct dispatch to the provider `config` names.
    pub async fn embed(
        &self,
        config: &ProviderConfig,
        request: impl Into<EmbedRequest>,
    ) -> Result<EmbedResponse> {
        dispatch(&self.registry, config, &request.into()).await
    }

    /// First successful provider in priority order.
    pub async fn auto_embed(&self, request: impl Into<EmbedRequest>) -> Result<EmbedResponse> {
        self.selector.auto_embed(&self.registry, &request.into()).await
    }

    pub fn list_supported_providers(&self) -> Vec<ProviderId> {
        self.registry.list_supported()
    }

    /// Constructs a provider without the readiness check `embed` performs.
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<EmbeddingProvider> {
        self.registry.create(config)
    }

    /// Releases native model handles. Call at shutdown.
    pub async fn release(&self) {
        self.registry.release().await;
    }
}

fn load_env_config() -> Result<EnvEmbeddingConfig> {
    EnvEmbeddingConfig::from_env().map_err(|e| EmbeddingError::Config(format!("{e:#}")))
}
