//! Embedding configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

use crate::types::{ProviderConfig, ProviderId};

/// Embedding configuration interface: where provider credentials and overrides come from.
pub trait EmbeddingConfig: Send + Sync {
    /// API key for `provider`, if one is configured. Always `None` for the native backend.
    fn credential(&self, provider: ProviderId) -> Option<&str>;
    /// Base URL override (remote) or model file path (native).
    fn endpoint(&self, provider: ProviderId) -> Option<&str>;
    /// Model override; `None` means the provider's default.
    fn model(&self, provider: ProviderId) -> Option<&str>;
    fn timeout_ms(&self) -> Option<u64>;
    fn max_retries(&self) -> Option<u32>;

    /// Full [`ProviderConfig`] for one provider.
    fn provider_config(&self, provider: ProviderId) -> ProviderConfig {
        ProviderConfig {
            provider,
            model: self.model(provider).map(str::to_string),
            credential: self.credential(provider).map(str::to_string),
            endpoint: self.endpoint(provider).map(str::to_string),
            timeout_ms: self.timeout_ms(),
            max_retries: self.max_retries(),
        }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvEmbeddingConfig {
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub mistral: ProviderSettings,
    /// Model file for the native backend (NATIVE_EMBEDDING_MODEL).
    pub native_model_path: Option<String>,
    /// Model name for the native backend (NATIVE_EMBEDDING_MODEL_NAME).
    pub native_model_name: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn credential(&self, provider: ProviderId) -> Option<&str> {
        self.settings(provider)
            .and_then(|s| s.api_key.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
    fn endpoint(&self, provider: ProviderId) -> Option<&str> {
        let endpoint = match provider {
            ProviderId::Native => self.native_model_path.as_deref(),
            _ => self.settings(provider).and_then(|s| s.base_url.as_deref()),
        };
        endpoint.filter(|s| !s.trim().is_empty())
    }
    fn model(&self, provider: ProviderId) -> Option<&str> {
        let model = match provider {
            ProviderId::Native => self.native_model_name.as_deref(),
            _ => self.settings(provider).and_then(|s| s.model.as_deref()),
        };
        model.filter(|s| !s.trim().is_empty())
    }
    fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }
    fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables. Unset and empty variables are treated alike.
    pub fn from_env() -> Result<Self> {
        let timeout_ms = var("EMBEDDING_TIMEOUT_MS")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("EMBEDDING_TIMEOUT_MS must be an integer number of milliseconds")?;
        let max_retries = var("EMBEDDING_MAX_RETRIES")
            .map(|s| s.parse::<u32>())
            .transpose()
            .context("EMBEDDING_MAX_RETRIES must be a non-negative integer")?;

        Ok(Self {
            openai: ProviderSettings {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("OPENAI_BASE_URL"),
                model: var("OPENAI_EMBEDDING_MODEL"),
            },
            gemini: ProviderSettings {
                api_key: var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")),
                base_url: var("GEMINI_BASE_URL"),
                model: var("GEMINI_EMBEDDING_MODEL"),
            },
            mistral: ProviderSettings {
                api_key: var("MISTRAL_API_KEY"),
                base_url: var("MISTRAL_BASE_URL"),
                model: var("MISTRAL_EMBEDDING_MODEL"),
            },
            native_model_path: var("NATIVE_EMBEDDING_MODEL"),
            native_model_name: var("NATIVE_EMBEDDING_MODEL_NAME"),
            timeout_ms,
            max_retries,
        })
    }

    fn settings(&self, provider: ProviderId) -> Option<&ProviderSettings> {
        match provider {
            ProviderId::Native => None,
            ProviderId::OpenAi => Some(&self.openai),
            ProviderId::Gemini => Some(&self.gemini),
            ProviderId::Mistral => Some(&self.mistral),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
