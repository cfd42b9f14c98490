//! # Gemini Embedding Service
//!
//! `EmbeddingService` over Google's Generative Language API.
//!
//! Single texts go to `models/{model}:embedContent`; batches go to
//! `models/{model}:batchEmbedContents`, which answers in request order. The API key is sent
//! in the `x-goog-api-key` header.
//!
//! ## Supported Models
//!
//! - `text-embedding-004`: 768 dimensions (default)
//! - `embedding-001`: 768 dimensions
//! - `gemini-embedding-001`: 3072 dimensions

use async_trait::async_trait;
use embedding::{Embedding, EmbeddingService, Embeddings, ProviderConfig};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "text-embedding-004";
const PROVIDER_NAME: &str = "gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub fn dimensions_for_model(model: &str) -> usize {
    match model {
        "gemini-embedding-001" => 3072,
        "text-embedding-004" | "embedding-001" => 768,
        _ => 768,
    }
}

#[derive(Debug, Clone)]
pub struct GeminiEmbedding {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiEmbedding {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Sends requests to `base_url` instead of the public endpoint when given.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(GEMINI_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, DEFAULT_MODEL.to_string())
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new_with_base_url(
            config.credential().unwrap_or_default().to_string(),
            config.model().unwrap_or(DEFAULT_MODEL).to_string(),
            config.endpoint(),
        )
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Model resource name as the API expects it (`models/<id>`).
    fn resource(&self) -> String {
        if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R, anyhow::Error>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}:{}", self.base_url, self.resource(), method);
        let response = self
            .authorized(self.client.post(url))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, method, "Gemini request rejected");
            return Err(anyhow::anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: [Part { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct BatchItem<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<BatchItem<'a>>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        dimensions_for_model(self.model.trim_start_matches("models/"))
    }

    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, anyhow::Error> {
        let request = EmbedContentRequest {
            content: Content::text(text),
        };
        let response: EmbedContentResponse = self.post("embedContent", &request).await?;

        let vector = response.embedding.values;
        info!(dimension = vector.len(), "step: embedding Gemini embed done");
        Ok(Embedding::new(vector))
    }

    /// One `batchEmbedContents` call; the response lists embeddings in request order.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Embeddings, anyhow::Error> {
        if texts.is_empty() {
            return Ok(Embeddings::default());
        }

        let resource = self.resource();
        let request = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| BatchItem {
                    model: &resource,
                    content: Content::text(text),
                })
                .collect(),
        };
        let response: BatchEmbedContentsResponse =
            self.post("batchEmbedContents", &request).await?;

        let vectors: Vec<Vec<f32>> = response.embeddings.into_iter().map(|e| e.values).collect();
        if vectors.len() != texts.len() {
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            ));
        }

        info!(
            count = vectors.len(),
            "step: embedding Gemini embed_batch done"
        );
        Ok(Embeddings::new(vectors))
    }

    /// Fetches the model resource (`GET models/{model}`).
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is not set");
        }
        let url = format!("{}/{}", self.base_url, self.resource());
        let response = self.authorized(self.client.get(url)).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Gemini health check failed ({})", response.status());
        }
        debug!("Gemini health check ok");
        Ok(())
    }
}
