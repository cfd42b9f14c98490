//! # Native Embedding Service
//!
//! Runs embeddings in-process from a local model file; needs no credential.
//!
//! The model lives in a [`ModelHandle`] that is loaded on first use and shared by every
//! [`NativeEmbedding`] built for the same file, so repeated provider construction does not
//! reload it. [`ModelCache`] hands out those shared handles and releases them all at once.
//!
//! ## Model file lookup
//!
//! When the provider config carries an `endpoint`, that path is used as is. Otherwise the
//! first existing candidate wins:
//!
//! 1. `$NATIVE_EMBEDDING_MODEL`
//! 2. `./models/<model>.gguf`
//! 3. `~/.cache/embedding/models/<model>.gguf`

mod model;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use embedding::{Embedding, EmbeddingService, Embeddings, PathResolver, ProviderConfig};
use tracing::{debug, instrument};

pub use model::{ModelHandle, NativeModel, NATIVE_DIMENSIONS};

pub const DEFAULT_MODEL: &str = "nomic-embed-text-v1.5.Q4_K_M";
pub const MODEL_PATH_ENV: &str = "NATIVE_EMBEDDING_MODEL";
const PROVIDER_NAME: &str = "native";

/// Where to look for `<model>.gguf` when no explicit path is configured.
pub fn default_resolver(model: &str) -> PathResolver {
    let file = format!("{model}.gguf");
    PathResolver::new()
        .env(MODEL_PATH_ENV)
        .fixed(format!("models/{file}"))
        .home_relative(format!(".cache/embedding/models/{file}"))
}

/// Model handles keyed by model name and explicit path.
#[derive(Debug, Default)]
pub struct ModelCache {
    handles: Mutex<HashMap<(String, Option<String>), Arc<ModelHandle>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle for the model `config` names; created (unloaded) on first request.
    pub fn handle_for(&self, config: &ProviderConfig) -> Arc<ModelHandle> {
        let model = config.model().unwrap_or(DEFAULT_MODEL).to_string();
        let endpoint = config.endpoint().map(str::to_string);
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles
            .entry((model.clone(), endpoint.clone()))
            .or_insert_with(|| {
                let resolver = match &endpoint {
                    Some(path) => PathResolver::new().fixed(path),
                    None => default_resolver(&model),
                };
                Arc::new(ModelHandle::new(resolver))
            })
            .clone()
    }

    /// Releases every handle handed out so far.
    pub async fn release_all(&self) {
        let handles: Vec<Arc<ModelHandle>> = {
            let handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            handles.values().cloned().collect()
        };
        for handle in handles {
            handle.release().await;
        }
    }
}

/// `EmbeddingService` over a shared [`ModelHandle`].
#[derive(Debug, Clone)]
pub struct NativeEmbedding {
    model: String,
    handle: Arc<ModelHandle>,
}

impl NativeEmbedding {
    pub fn new(model: impl Into<String>, handle: Arc<ModelHandle>) -> Self {
        Self {
            model: model.into(),
            handle,
        }
    }

    /// Builds the service over the cache's shared handle for `config`.
    pub fn from_config(config: &ProviderConfig, cache: &ModelCache) -> Self {
        Self::new(
            config.model().unwrap_or(DEFAULT_MODEL),
            cache.handle_for(config),
        )
    }

    pub fn handle(&self) -> &Arc<ModelHandle> {
        &self.handle
    }
}

#[async_trait]
impl EmbeddingService for NativeEmbedding {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        NATIVE_DIMENSIONS
    }

    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, anyhow::Error> {
        let vector = self.handle.with_model(|model| model.embed(text)).await?;
        Ok(Embedding::new(vector))
    }

    /// Embeds each text in order under one hold of the handle.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings, anyhow::Error> {
        if texts.is_empty() {
            return Ok(Embeddings::default());
        }
        let vectors: Vec<Vec<f32>> = self
            .handle
            .with_model(|model| texts.iter().map(|text| model.embed(text)).collect())
            .await?;
        debug!(count = texts.len(), "native embed_batch done");
        Ok(Embeddings::new(vectors))
    }

    /// Ready once the model file has loaded.
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        self.handle.ensure_loaded().await
    }

    async fn release(&self) {
        self.handle.release().await;
    }
}
