//! # Text Embeddings
//!
//! Shared contract for the embedding provider crates:
//!
//! - [`EmbeddingService`]: the backend adapter each vendor/local crate implements.
//! - [`EmbeddingProvider`]: the uniform provider contract (input resolution, timeouts,
//!   retries, dimension checks) layered over any service.
//! - Data model ([`ProviderConfig`], [`EmbedInput`], [`EmbedResult`], ...) and the
//!   [`EmbeddingError`] taxonomy.
//! - Env configuration ([`EnvEmbeddingConfig`]), resource path lookup ([`PathResolver`]),
//!   and tracing setup ([`init_tracing`]).

mod config;
mod error;
mod input;
mod logger;
mod paths;
mod provider;
mod service;
mod types;

pub use config::{EmbeddingConfig, EnvEmbeddingConfig, ProviderSettings};
pub use error::{CandidateFailure, CandidateOutcome, EmbeddingError, Result};
pub use input::{preview, resolve_input, resolve_inputs};
pub use logger::init_tracing;
pub use paths::{PathCandidate, PathResolver};
pub use provider::EmbeddingProvider;
pub use service::EmbeddingService;
pub use types::{
    BatchEmbedResult, EmbedInput, EmbedRequest, EmbedResponse, EmbedResult, Embedding,
    Embeddings, ProviderConfig, ProviderId, Usage, DEFAULT_BATCH_TIMEOUT, DEFAULT_EMBED_TIMEOUT,
};
