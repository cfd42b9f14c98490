//! The uniform provider contract over any [`EmbeddingService`].
//!
//! [`EmbeddingProvider`] resolves inputs, bounds every backend call with the configured
//! timeout, retries transient failures, and checks that what comes back has the shape the
//! backend declared. A bad shape is a [`EmbeddingError::Backend`], never patched up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::error::{EmbeddingError, Result};
use crate::input::{preview, resolve_input, resolve_inputs};
use crate::service::EmbeddingService;
use crate::types::{
    BatchEmbedResult, EmbedInput, EmbedResult, ProviderConfig, ProviderId, DEFAULT_BATCH_TIMEOUT,
    DEFAULT_EMBED_TIMEOUT,
};

const RETRY_BACKOFF: Duration = Duration::from_millis(100);
const LOG_PREVIEW_LEN: usize = 200;

/// One backend behind the provider contract. Holds its own copy of the config.
#[derive(Clone)]
pub struct EmbeddingProvider {
    config: ProviderConfig,
    service: Arc<dyn EmbeddingService>,
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("provider", &self.service.name())
            .field("model", &self.service.model())
            .field("dimensions", &self.service.dimensions())
            .finish()
    }
}

impl EmbeddingProvider {
    pub fn new(config: ProviderConfig, service: Arc<dyn EmbeddingService>) -> Self {
        Self { config, service }
    }

    pub fn id(&self) -> ProviderId {
        self.config.provider
    }

    /// Stable name used in result records and logs.
    pub fn provider_name(&self) -> &str {
        self.service.name()
    }

    pub fn model(&self) -> &str {
        self.service.model()
    }

    /// Declared vector width; every result is checked against it.
    pub fn dimensions(&self) -> usize {
        self.service.dimensions()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Readiness probe. Never fails: errors and timeouts are logged and reported as `false`.
    /// Not cached; backend health can change between calls.
    pub async fn is_ready(&self) -> bool {
        let timeout = self.config.timeout_or(DEFAULT_EMBED_TIMEOUT);
        match tokio::time::timeout(timeout, self.service.health_check()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(provider = %self.provider_name(), error = %e, "readiness check failed");
                false
            }
            Err(_) => {
                warn!(
                    provider = %self.provider_name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "readiness check timed out"
                );
                false
            }
        }
    }

    /// Embeds one input. Issues one backend request (plus configured retries).
    #[instrument(skip(self, input), fields(provider = %self.provider_name(), model = %self.model()))]
    pub async fn embed(&self, input: &EmbedInput) -> Result<EmbedResult> {
        let text = resolve_input(input).await?;
        info!(
            text_preview = %preview(&text, LOG_PREVIEW_LEN),
            text_len = text.len(),
            "step: embedding request"
        );

        let service = self.service.as_ref();
        let text_ref = text.as_str();
        let timeout = self.config.timeout_or(DEFAULT_EMBED_TIMEOUT);
        let embedding = self.call(timeout, move || service.embed(text_ref)).await?;

        let dimensions = self.check_width(embedding.vector.len(), None)?;
        info!(dimension = dimensions, "step: embedding done");
        Ok(EmbedResult {
            embedding: embedding.vector,
            dimensions,
            provider: self.provider_name().to_string(),
            model: self.model().to_string(),
            usage: embedding.usage,
        })
    }

    /// Embeds a batch. Output order matches input order; any failing item fails the batch.
    #[instrument(skip(self, inputs), fields(provider = %self.provider_name(), model = %self.model(), batch_size = inputs.len()))]
    pub async fn embed_batch(&self, inputs: &[EmbedInput]) -> Result<BatchEmbedResult> {
        let dimensions = self.dimensions();
        if inputs.is_empty() {
            return Ok(BatchEmbedResult {
                embeddings: Vec::new(),
                dimensions,
                provider: self.provider_name().to_string(),
                model: self.model().to_string(),
                usage: None,
            });
        }

        let texts = resolve_inputs(inputs).await?;
        info!(batch_size = texts.len(), "step: embedding batch request");

        let service = self.service.as_ref();
        let texts_ref = texts.as_slice();
        let timeout = self.config.timeout_or(DEFAULT_BATCH_TIMEOUT);
        let output = self.call(timeout, move || service.embed_batch(texts_ref)).await?;

        if output.vectors.len() != inputs.len() {
            return Err(EmbeddingError::backend(
                self.provider_name(),
                format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    output.vectors.len()
                ),
            ));
        }
        for (index, vector) in output.vectors.iter().enumerate() {
            self.check_width(vector.len(), Some(index))?;
        }

        info!(
            count = output.vectors.len(),
            dimension = dimensions,
            "step: embedding batch done"
        );
        Ok(BatchEmbedResult {
            embeddings: output.vectors,
            dimensions,
            provider: self.provider_name().to_string(),
            model: self.model().to_string(),
            usage: output.usage,
        })
    }

    /// Releases a persistent backend handle, if any. Called by the owning application.
    pub async fn release(&self) {
        self.service.release().await;
    }

    /// Runs one backend operation under `timeout`, retrying transient failures.
    async fn call<T, F, Fut>(&self, timeout: Duration, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let max_retries = self.config.max_retries();
        let mut attempt = 0u32;
        loop {
            let err = match tokio::time::timeout(timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => EmbeddingError::backend(self.provider_name(), format!("{e:#}")),
                Err(_) => EmbeddingError::Timeout {
                    provider: self.provider_name().to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                },
            };
            if attempt >= max_retries || !err.is_retryable() {
                warn!(provider = %self.provider_name(), error = %err, "embedding request failed");
                return Err(err);
            }
            attempt += 1;
            warn!(
                provider = %self.provider_name(),
                attempt,
                max_retries,
                error = %err,
                "embedding request failed, retrying"
            );
            tokio::time::sleep(RETRY_BACKOFF * attempt).await;
        }
    }

    fn check_width(&self, got: usize, index: Option<usize>) -> Result<usize> {
        let declared = self.dimensions();
        if got != 0 && got == declared {
            return Ok(got);
        }
        let which = match index {
            Some(i) => format!("embedding {i}"),
            None => "embedding".to_string(),
        };
        Err(EmbeddingError::backend(
            self.provider_name(),
            format!("{which} has {got} dimensions, provider declares {declared}"),
        ))
    }
}
