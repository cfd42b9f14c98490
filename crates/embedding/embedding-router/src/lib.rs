//! # Embedding Router
//!
//! One call surface over every embedding backend:
//!
//! - [`embed`]: direct dispatch to the provider a [`ProviderConfig`] names. Fails if that
//!   provider is not ready; never falls back.
//! - [`auto_embed`]: tries [`PROVIDER_PRIORITY`] in order, skipping providers without a
//!   credential, and returns the first success.
//! - [`list_supported_providers`] and [`create_provider`] for diagnostics and direct use.
//!
//! The free functions build a fresh [`ProviderRegistry`] and read the environment on every
//! call. Applications that embed repeatedly should hold an [`EmbeddingRouter`] instead, so a
//! local model is loaded once.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedding::{EmbedInput, ProviderConfig, ProviderId};
//!
//! async fn example() -> embedding::Result<()> {
//!     let config = ProviderConfig::new(ProviderId::OpenAi).with_credential("sk-...");
//!     let response = embedding_router::embed(&config, EmbedInput::text("hello")).await?;
//!     println!("{} dims from {}", response.dimensions(), response.provider());
//!
//!     let response = embedding_router::auto_embed(vec![
//!         EmbedInput::text("a"),
//!         EmbedInput::file("doc.txt"),
//!     ])
//!     .await?;
//!     println!("batch embedded by {}", response.provider());
//!     Ok(())
//! }
//! ```

mod dispatch;
mod failure_cache;
mod registry;
mod router;
mod selector;

use embedding::{EmbedRequest, EmbedResponse, EmbeddingProvider, ProviderConfig, ProviderId, Result};

pub use dispatch::dispatch;
pub use failure_cache::FailureCache;
pub use registry::{ProviderFactory, ProviderRegistry};
pub use router::EmbeddingRouter;
pub use selector::{AutoSelector, PROVIDER_PRIORITY};

/// Embeds with the provider `config` names, using the built-in registry.
pub async fn embed(
    config: &ProviderConfig,
    request: impl Into<EmbedRequest>,
) -> Result<EmbedResponse> {
    dispatch(&ProviderRegistry::with_defaults(), config, &request.into()).await
}

/// Embeds with the first available provider, with credentials read from the environment.
pub async fn auto_embed(request: impl Into<EmbedRequest>) -> Result<EmbedResponse> {
    EmbeddingRouter::from_env()?.auto_embed(request).await
}

pub fn list_supported_providers() -> Vec<ProviderId> {
    ProviderRegistry::with_defaults().list_supported()
}

/// Constructs a built-in provider without checking readiness.
pub fn create_provider(config: &ProviderConfig) -> Result<EmbeddingProvider> {
    ProviderRegistry::with_defaults().create(config)
}
