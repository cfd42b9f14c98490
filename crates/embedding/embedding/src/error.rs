use std::fmt;

use thiserror::Error;

use crate::types::ProviderId;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Provider '{provider}' is not ready")]
    NotReady { provider: String },

    #[error("Backend error ({provider}): {message}")]
    Backend { provider: String, message: String },

    #[error("Timeout ({provider}): no response after {timeout_ms} ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("No embedding provider available: {}", format_attempts(.attempts))]
    NoProviderAvailable { attempts: Vec<CandidateFailure> },
}

impl EmbeddingError {
    pub fn backend(provider: impl Into<String>, message: impl fmt::Display) -> Self {
        EmbeddingError::Backend {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Only transient backend failures are worth repeating.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Backend { .. } | EmbeddingError::Timeout { .. }
        )
    }
}

/// Why the auto-selector moved past a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Not attempted (missing credential, recent failure).
    Skipped(String),
    /// Attempted and failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub provider: ProviderId,
    pub outcome: CandidateOutcome,
}

impl CandidateFailure {
    pub fn skipped(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self {
            provider,
            outcome: CandidateOutcome::Skipped(reason.into()),
        }
    }

    pub fn failed(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self {
            provider,
            outcome: CandidateOutcome::Failed(reason.into()),
        }
    }

    pub fn was_attempted(&self) -> bool {
        matches!(self.outcome, CandidateOutcome::Failed(_))
    }
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CandidateOutcome::Skipped(reason) => {
                write!(f, "{} skipped ({})", self.provider, reason)
            }
            CandidateOutcome::Failed(reason) => write!(f, "{} failed ({})", self.provider, reason),
        }
    }
}

fn format_attempts(attempts: &[CandidateFailure]) -> String {
    if attempts.is_empty() {
        return "no candidates configured".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;
