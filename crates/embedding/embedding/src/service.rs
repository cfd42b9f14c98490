//! Backend adapter interface.
//!
//! One implementation per vendor API or local inference handle. Implementations only
//! map their backend's native shape into [`Embedding`] / [`Embeddings`]; input resolution,
//! timeouts, retries and shape validation live in [`crate::EmbeddingProvider`].

use async_trait::async_trait;

use crate::types::{Embedding, Embeddings};

/// Service for generating text embeddings from one backend.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Provider type identifier (e.g. "openai", "native").
    fn name(&self) -> &str;

    /// Model identifier sent to the backend.
    fn model(&self) -> &str;

    /// Declared width of vectors produced by [`Self::model`]. No network access.
    fn dimensions(&self) -> usize;

    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Embedding, anyhow::Error>;

    /// Generates embedding vectors for multiple texts, in input order.
    ///
    /// Backends with a multi-input API should override this with a single round trip.
    /// The default embeds each text in turn and stops at the first failure.
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings, anyhow::Error> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?.vector);
        }
        Ok(Embeddings::new(vectors))
    }

    /// Cheap probe that the backend can currently serve requests.
    async fn health_check(&self) -> Result<(), anyhow::Error>;

    /// Releases any persistent handle held by the backend.
    async fn release(&self) {}
}
