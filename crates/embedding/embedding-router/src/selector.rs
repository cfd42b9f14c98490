//! Credential-gated, fixed-order provider fallback.

use std::sync::Arc;

use embedding::{
    CandidateFailure, EmbedRequest, EmbedResponse, EmbeddingConfig, EmbeddingError,
    ProviderConfig, ProviderId, Result,
};
use tracing::{info, instrument, warn};

use crate::dispatch::dispatch;
use crate::failure_cache::FailureCache;
use crate::registry::ProviderRegistry;

/// Order in which [`AutoSelector`] tries providers. The local backend comes first: it needs
/// no credential and works offline.
pub const PROVIDER_PRIORITY: [ProviderId; 4] = [
    ProviderId::Native,
    ProviderId::OpenAi,
    ProviderId::Gemini,
    ProviderId::Mistral,
];

/// Tries each candidate in order and returns the first success.
///
/// Candidates that need a credential and have none are skipped without being constructed.
/// Every other failure is logged and the next candidate is tried. When nothing succeeds the
/// error lists each candidate and why it was passed over.
#[derive(Debug, Clone)]
pub struct AutoSelector {
    candidates: Vec<ProviderConfig>,
    failures: Option<Arc<FailureCache>>,
}

impl AutoSelector {
    /// Candidates evaluated exactly in the given order.
    pub fn new(candidates: Vec<ProviderConfig>) -> Self {
        Self {
            candidates,
            failures: None,
        }
    }

    /// One candidate per entry of [`PROVIDER_PRIORITY`], configured from `config`.
    pub fn from_config(config: &dyn EmbeddingConfig) -> Self {
        Self::new(
            PROVIDER_PRIORITY
                .iter()
                .map(|id| config.provider_config(*id))
                .collect(),
        )
    }

    /// Skips providers that failed recently, as recorded in `cache`.
    pub fn with_failure_cache(mut self, cache: Arc<FailureCache>) -> Self {
        self.failures = Some(cache);
        self
    }

    pub fn candidates(&self) -> &[ProviderConfig] {
        &self.candidates
    }

    pub fn failure_cache(&self) -> Option<&Arc<FailureCache>> {
        self.failures.as_ref()
    }

    /// Embeds with the first candidate that succeeds and reports which one it was.
    /// The whole request, batch or single, goes to one provider.
    #[instrument(skip(self, registry, request), fields(candidates = self.candidates.len(), batch = request.is_batch()))]
    pub async fn select(
        &self,
        registry: &ProviderRegistry,
        request: &EmbedRequest,
    ) -> Result<(ProviderId, EmbedResponse)> {
        let mut attempts = Vec::with_capacity(self.candidates.len());

        for candidate in &self.candidates {
            let id = candidate.provider;
            if let Some(skip) = self.skip_reason(candidate) {
                info!(provider = %id, reason = %skip, "auto embed skipping candidate");
                attempts.push(CandidateFailure::skipped(id, skip));
                continue;
            }

            match dispatch(registry, candidate, request).await {
                Ok(response) => {
                    if let Some(cache) = &self.failures {
                        cache.clear(id);
                    }
                    info!(
                        provider = %id,
                        dimension = response.dimensions(),
                        "step: auto embed selected provider"
                    );
                    return Ok((id, response));
                }
                Err(e) => {
                    warn!(provider = %id, error = %e, "auto embed candidate failed, trying next");
                    // A bad input fails every provider alike; it says nothing about this one.
                    if !matches!(e, EmbeddingError::Input(_)) {
                        if let Some(cache) = &self.failures {
                            cache.record_failure(id);
                        }
                    }
                    attempts.push(CandidateFailure::failed(id, e.to_string()));
                }
            }
        }

        let err = EmbeddingError::NoProviderAvailable { attempts };
        warn!(error = %err, "auto embed exhausted all candidates");
        Err(err)
    }

    /// [`Self::select`] without the winning provider id.
    pub async fn auto_embed(
        &self,
        registry: &ProviderRegistry,
        request: &EmbedRequest,
    ) -> Result<EmbedResponse> {
        self.select(registry, request)
            .await
            .map(|(_, response)| response)
    }

    fn skip_reason(&self, candidate: &ProviderConfig) -> Option<String> {
        let id = candidate.provider;
        if id.requires_credential() && candidate.credential().is_none() {
            return Some("no credential configured".to_string());
        }
        let elapsed = self.failures.as_ref()?.recent_failure(id)?;
        Some(format!("recent failure {} ms ago", elapsed.as_millis()))
    }
}
