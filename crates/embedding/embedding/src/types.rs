//! Request/response data model shared by every embedding provider.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Timeout for a single embed request when `timeout_ms` is not configured.
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for a batch request (larger payload) when `timeout_ms` is not configured.
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Identifier of an embedding backend. Closed set; declaration order is the
/// ordering used by registries and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Local native inference handle; needs no credential.
    Native,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    Mistral,
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Native,
        ProviderId::OpenAi,
        ProviderId::Gemini,
        ProviderId::Mistral,
    ];

    /// Stable lowercase identifier used in results and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Native => "native",
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
            ProviderId::Mistral => "mistral",
        }
    }

    /// Remote vendor APIs need an API key; the native backend does not.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderId::Native)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "local" => Ok(ProviderId::Native),
            "openai" => Ok(ProviderId::OpenAi),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            "mistral" => Ok(ProviderId::Mistral),
            _ => Err(EmbeddingError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Per-request provider configuration. A provider captures its own copy at
/// construction, so later changes by the caller have no effect on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    /// Base URL override for remote APIs; model file path for the native backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl ProviderConfig {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            model: None,
            credential: None,
            endpoint: None,
            timeout_ms: None,
            max_retries: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Credential if present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(0)
    }

    /// Configured timeout, or `fallback` when unset.
    pub fn timeout_or(&self, fallback: Duration) -> Duration {
        self.timeout_ms.map(Duration::from_millis).unwrap_or(fallback)
    }

    /// Rejects configs that can never succeed, before any backend is touched.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.provider.requires_credential() && self.credential().is_none() {
            return Err(EmbeddingError::Config(format!(
                "provider '{}' requires a credential",
                self.provider
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(EmbeddingError::Config(format!(
                "provider '{}': timeout_ms must be greater than zero",
                self.provider
            )));
        }
        Ok(())
    }
}

/// One unit of input: literal text or a UTF-8 file to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbedInput {
    Text(String),
    #[serde(rename = "filePath")]
    File(PathBuf),
}

impl EmbedInput {
    pub fn text(text: impl Into<String>) -> Self {
        EmbedInput::Text(text.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        EmbedInput::File(path.into())
    }
}

impl From<&str> for EmbedInput {
    fn from(text: &str) -> Self {
        EmbedInput::Text(text.to_string())
    }
}

impl From<String> for EmbedInput {
    fn from(text: String) -> Self {
        EmbedInput::Text(text)
    }
}

/// Token accounting reported by some vendors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedResult {
    pub embedding: Vec<f32>,
    pub dimensions: usize,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Order-preserving batch result: `embeddings[i]` belongs to input `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmbedResult {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One-or-many argument of `embed` / `auto_embed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedRequest {
    Single(EmbedInput),
    Batch(Vec<EmbedInput>),
}

impl EmbedRequest {
    pub fn len(&self) -> usize {
        match self {
            EmbedRequest::Single(_) => 1,
            EmbedRequest::Batch(inputs) => inputs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, EmbedRequest::Batch(_))
    }
}

impl From<EmbedInput> for EmbedRequest {
    fn from(input: EmbedInput) -> Self {
        EmbedRequest::Single(input)
    }
}

impl From<Vec<EmbedInput>> for EmbedRequest {
    fn from(inputs: Vec<EmbedInput>) -> Self {
        EmbedRequest::Batch(inputs)
    }
}

impl From<&str> for EmbedRequest {
    fn from(text: &str) -> Self {
        EmbedRequest::Single(EmbedInput::from(text))
    }
}

/// Result matching the shape of the [`EmbedRequest`] that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbedResponse {
    Single(EmbedResult),
    Batch(BatchEmbedResult),
}

impl EmbedResponse {
    pub fn provider(&self) -> &str {
        match self {
            EmbedResponse::Single(r) => &r.provider,
            EmbedResponse::Batch(r) => &r.provider,
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            EmbedResponse::Single(r) => r.dimensions,
            EmbedResponse::Batch(r) => r.dimensions,
        }
    }

    pub fn into_single(self) -> Option<EmbedResult> {
        match self {
            EmbedResponse::Single(r) => Some(r),
            EmbedResponse::Batch(_) => None,
        }
    }

    pub fn into_batch(self) -> Option<BatchEmbedResult> {
        match self {
            EmbedResponse::Batch(r) => Some(r),
            EmbedResponse::Single(_) => None,
        }
    }
}

/// Backend-native output for one text, before normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub usage: Option<Usage>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector, usage: None }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Backend-native output for a batch, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Embeddings {
    pub vectors: Vec<Vec<f32>>,
    pub usage: Option<Usage>,
}

impl Embeddings {
    pub fn new(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors, usage: None }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}
