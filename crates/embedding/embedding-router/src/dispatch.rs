//! Direct, non-fallback dispatch to one named provider.

use embedding::{EmbedRequest, EmbedResponse, EmbeddingError, ProviderConfig, Result};
use tracing::{error, instrument};

use crate::registry::ProviderRegistry;

/// Creates the provider `config` names, checks it is ready, and routes `request` to
/// `embed` or `embed_batch` by shape. Errors are logged and returned unchanged; there is
/// no fallback to another provider.
#[instrument(skip(registry, config, request), fields(provider = %config.provider, batch = request.is_batch()))]
pub async fn dispatch(
    registry: &ProviderRegistry,
    config: &ProviderConfig,
    request: &EmbedRequest,
) -> Result<EmbedResponse> {
    let result = route(registry, config, request).await;
    if let Err(e) = &result {
        error!(provider = %config.provider, error = %e, "embedding dispatch failed");
    }
    result
}

async fn route(
    registry: &ProviderRegistry,
    config: &ProviderConfig,
    request: &EmbedRequest,
) -> Result<EmbedResponse> {
    let provider = registry.create(config)?;
    if !provider.is_ready().await {
        return Err(EmbeddingError::NotReady {
            provider: provider.provider_name().to_string(),
        });
    }

    match request {
        EmbedRequest::Single(input) => provider.embed(input).await.map(EmbedResponse::Single),
        EmbedRequest::Batch(inputs) => provider
            .embed_batch(inputs)
            .await
            .map(EmbedResponse::Batch),
    }
}
