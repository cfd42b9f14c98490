//! # OpenAI Embedding Service
//!
//! This crate provides an implementation of the `EmbeddingService` trait using OpenAI's embedding API.
//!
//! ## OpenAIEmbedding
//!
//! Uses OpenAI's embedding models (e.g., `text-embedding-3-small`, `text-embedding-3-large`).
//!
//! **Considerations**:
//! - Requires API key
//! - Rate limits
//! - Cost per request
//!
//! ## Example
//!
//! ```rust,no_run
//! use openai_embedding::OpenAIEmbedding;
//! use embedding::EmbeddingService;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = OpenAIEmbedding::with_api_key("sk-...".to_string());
//!     let embedding = service.embed("Hello world").await?;
//!     println!("Embedding dimension: {}", embedding.vector.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Models
//!
//! - `text-embedding-3-small`: 1536 dimensions, cost-effective
//! - `text-embedding-3-large`: 3072 dimensions, higher accuracy
//! - `text-embedding-ada-002`: 1536 dimensions (legacy model)
//!
//! Unknown model names are assumed to produce 1536 dimensions; the provider layer rejects
//! any response that disagrees.

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use embedding::{Embedding, EmbeddingService, Embeddings, ProviderConfig, Usage};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
const PROVIDER_NAME: &str = "openai";

/// Declared output width for an OpenAI embedding model.
pub fn dimensions_for_model(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        "text-embedding-3-small" | "text-embedding-ada-002" => 1536,
        _ => 1536,
    }
}

/// OpenAI embedding service implementation. Holds the async-openai client and model name.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    /// OpenAI client used for embeddings API calls.
    client: Client<OpenAIConfig>,
    /// Embedding model name (e.g. "text-embedding-3-small").
    model: String,
    /// Whether a non-empty key was supplied; checked by the readiness probe.
    has_api_key: bool,
}

impl OpenAIEmbedding {
    /// Creates a new OpenAI embedding service.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key.
    /// * `model` - The embedding model to use (e.g., "text-embedding-3-small", "text-embedding-3-large").
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Creates a new OpenAI embedding service with optional base URL (e.g. an OpenAI-compatible proxy).
    ///
    /// When `base_url` is `Some`, requests are sent to that URL instead of the default OpenAI API.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let has_api_key = !api_key.trim().is_empty();
        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            openai_config = openai_config.with_api_base(url.trim_end_matches('/'));
        }
        let client = Client::with_config(openai_config);

        Self {
            client,
            model,
            has_api_key,
        }
    }

    /// Creates a new OpenAI embedding service with default model.
    ///
    /// Uses `text-embedding-3-small` as the default model.
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, DEFAULT_MODEL.to_string())
    }

    /// Builds the service from a provider config (credential, model, base URL).
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new_with_base_url(
            config.credential().unwrap_or_default().to_string(),
            config.model().unwrap_or(DEFAULT_MODEL).to_string(),
            config.endpoint(),
        )
    }

    /// Sets a different embedding model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl EmbeddingService for OpenAIEmbedding {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        dimensions_for_model(&self.model)
    }

    /// Generates an embedding vector for a single text string using OpenAI's API.
    ///
    /// # API Interaction
    ///
    /// 1. Constructs CreateEmbeddingRequest with configured model and input text
    /// 2. Sends HTTP POST request to OpenAI's embeddings endpoint
    /// 3. Returns the first (and only) embedding plus token usage
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key is not set or invalid
    /// - The API request fails (network error, rate limit, etc.)
    /// - The response is missing embeddings
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, anyhow::Error> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(vec![text])
            .build()?;

        let response = match self.client.embeddings().create(request).await {
            Ok(r) => {
                debug!("OpenAI embed response received");
                r
            }
            Err(e) => {
                warn!(error = %e, "OpenAI embed request failed");
                return Err(e.into());
            }
        };

        let usage = Usage {
            prompt_tokens: Some(response.usage.prompt_tokens),
            total_tokens: Some(response.usage.total_tokens),
        };
        let vector = match response.data.into_iter().next() {
            Some(item) => item.embedding,
            None => {
                warn!("OpenAI embed response has no embedding data");
                return Err(anyhow::anyhow!("No embedding in response"));
            }
        };

        info!(dimension = vector.len(), "step: embedding OpenAI embed done");
        Ok(Embedding::new(vector).with_usage(usage))
    }

    /// Generates embedding vectors for multiple texts in a single API call.
    ///
    /// Items in the response carry an `index`; they are re-ordered by it so that output `i`
    /// always belongs to input `i`.
    ///
    /// # Performance Considerations
    ///
    /// - Batch size limit: Up to 2048 texts per request (OpenAI API limit)
    /// - Single request reduces latency overhead
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings, anyhow::Error> {
        if texts.is_empty() {
            debug!("OpenAI embed_batch empty input, skipping");
            return Ok(Embeddings::default());
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let response = match self.client.embeddings().create(request).await {
            Ok(r) => {
                debug!("OpenAI embed_batch response received");
                r
            }
            Err(e) => {
                warn!(error = %e, "OpenAI embed_batch request failed");
                return Err(e.into());
            }
        };

        let usage = Usage {
            prompt_tokens: Some(response.usage.prompt_tokens),
            total_tokens: Some(response.usage.total_tokens),
        };
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        let misplaced = data.iter().enumerate().find(|(i, d)| d.index as usize != *i);
        if let Some((position, item)) = misplaced {
            return Err(anyhow::anyhow!(
                "Embedding at position {} has index {}; indices must be 0..{}",
                position,
                item.index,
                data.len()
            ));
        }
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|item| item.embedding).collect();

        if vectors.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = vectors.len(),
                "OpenAI embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            ));
        }

        info!(
            count = vectors.len(),
            "step: embedding OpenAI embed_batch done"
        );
        Ok(Embeddings::new(vectors).with_usage(usage))
    }

    /// Requires a key and a successful model lookup (`GET /models/{model}`).
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        if !self.has_api_key {
            anyhow::bail!("OpenAI API key is not set");
        }
        self.client.models().retrieve(&self.model).await?;
        Ok(())
    }
}
