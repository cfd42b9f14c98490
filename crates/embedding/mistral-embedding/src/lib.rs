//! # Mistral Embedding Service
//!
//! This crate provides an implementation of the `EmbeddingService` trait using Mistral AI's embedding API.
//!
//! ## MistralEmbedding
//!
//! Uses Mistral's `mistral-embed` model (1024 dimensions).
//!
//! **Considerations**:
//! - Requires API key
//! - Rate limits
//! - Cost per request
//!
//! ## Example
//!
//! ```rust,no_run
//! use mistral_embedding::MistralEmbedding;
//! use embedding::EmbeddingService;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = MistralEmbedding::with_api_key("your-api-key".to_string());
//!     let embedding = service.embed("Hello world").await?;
//!     println!("Embedding dimension: {}", embedding.vector.len());
//!     Ok(())
//! }
//! ```
//!
//! See [Mistral API Documentation](https://docs.mistral.ai/api/#tag/embeddings) for more details.

use async_trait::async_trait;
use embedding::{Embedding, EmbeddingService, Embeddings, ProviderConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

pub const MISTRAL_API_BASE: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-embed";
const PROVIDER_NAME: &str = "mistral";

/// Declared output width for a Mistral embedding model.
pub fn dimensions_for_model(model: &str) -> usize {
    match model {
        "mistral-embed" => 1024,
        "codestral-embed" => 1536,
        _ => 1024,
    }
}

/// Mistral embedding service implementation.
#[derive(Debug, Clone)]
pub struct MistralEmbedding {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl MistralEmbedding {
    /// Creates a new Mistral embedding service.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Mistral API key.
    /// * `model` - The embedding model to use (e.g., "mistral-embed").
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Same as [`MistralEmbedding::new`] but sends requests to `base_url` when given.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISTRAL_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    /// Creates a new Mistral embedding service with default model.
    ///
    /// Uses `mistral-embed` as the default model.
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

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn request(&self, input: Input<'_>) -> Result<EmbeddingResponse, anyhow::Error> {
        let request = EmbeddingRequest {
            model: &self.model,
            input,
        };

        let response = self
            .client
            .post(self.url("embeddings"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Mistral embeddings request rejected");
            return Err(anyhow::anyhow!("Mistral API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Input<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Input<'a> {
    Single(&'a str),
    Batch(&'a [&'a str]),
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl From<Usage> for embedding::Usage {
    fn from(usage: Usage) -> Self {
        embedding::Usage {
            prompt_tokens: usage.prompt_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[async_trait]
impl EmbeddingService for MistralEmbedding {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        dimensions_for_model(&self.model)
    }

    /// Generates an embedding vector for a single text string using Mistral's API.
    ///
    /// # API Interaction
    ///
    /// 1. Constructs JSON request with configured model and input text
    /// 2. Sends HTTP POST request to `{base_url}/embeddings` with bearer auth
    /// 3. Returns the first (and only) embedding from the response
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key is not set or invalid
    /// - The API request fails (network error, rate limit, etc.)
    /// - The response is malformed or missing embeddings
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, anyhow::Error> {
        let response = self.request(Input::Single(text)).await?;

        let usage = response.usage.map(embedding::Usage::from);
        let vector = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding in response"))?
            .embedding;

        info!(dimension = vector.len(), "step: embedding Mistral embed done");
        let embedding = Embedding::new(vector);
        Ok(match usage {
            Some(usage) => embedding.with_usage(usage),
            None => embedding,
        })
    }

    /// Generates embedding vectors for multiple texts in a single API call.
    ///
    /// Response items are sorted by `index` so output `i` belongs to input `i`.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings, anyhow::Error> {
        if texts.is_empty() {
            return Ok(Embeddings::default());
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let response = self.request(Input::Batch(&inputs)).await?;

        let usage = response.usage.map(embedding::Usage::from);
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        let misplaced = data.iter().enumerate().find(|(i, d)| d.index != *i);
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
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            ));
        }

        info!(
            count = vectors.len(),
            "step: embedding Mistral embed_batch done"
        );
        let embeddings = Embeddings::new(vectors);
        Ok(match usage {
            Some(usage) => embeddings.with_usage(usage),
            None => embeddings,
        })
    }

    /// Lists models (`GET {base_url}/models`); any 2xx means the key is accepted.
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("Mistral API key is not set");
        }
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("Mistral health check failed ({})", response.status());
        }
        debug!("Mistral health check ok");
        Ok(())
    }
}
