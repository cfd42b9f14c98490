//! The loaded model and its lifecycle handle.

use std::path::{Path, PathBuf};
use anyhow::Context;
use embedding::PathResolver;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Output width of the bundled model.
pub const NATIVE_DIMENSIONS: usize = 768;

/// A model file opened for inference.
///
/// Inference is a deterministic stand-in: component `i` is
/// `sin(sum(byte * (i + 1) * 0.001)) * 0.1` over the signed bytes of the text.
#[derive(Debug)]
pub struct NativeModel {
    path: PathBuf,
    n_embd: usize,
}

impl NativeModel {
    /// Opens the model at `path`. The path must name a regular file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to load model: {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Failed to load model: {} is not a file", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
            n_embd: NATIVE_DIMENSIONS,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn n_embd(&self) -> usize {
        self.n_embd
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        (0..self.n_embd)
            .map(|i| {
                let scale = (i + 1) as f32;
                let value: f32 = text
                    .bytes()
                    .map(|b| (b as i8) as f32 * scale * 0.001)
                    .sum();
                value.sin() * 0.1
            })
            .collect()
    }
}

/// Lazily loaded model shared by every provider built for the same model file.
///
/// The model sits behind one async mutex: loading, inference and release all run while
/// holding it, so calls on one handle never overlap. A failed load leaves the handle
/// unloaded and the next call tries again. The handle stays loaded until
/// [`ModelHandle::release`], which the owning application calls at shutdown.
#[derive(Debug)]
pub struct ModelHandle {
    resolver: PathResolver,
    model: Mutex<Option<NativeModel>>,
}

impl ModelHandle {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            model: Mutex::new(None),
        }
    }

    /// Handle for one explicit model file.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self::new(PathResolver::new().fixed(path))
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub async fn is_loaded(&self) -> bool {
        self.model.lock().await.is_some()
    }

    /// Loads the model if it is not loaded yet.
    pub async fn ensure_loaded(&self) -> anyhow::Result<()> {
        self.with_model(|_| ()).await
    }

    /// Runs `f` on the loaded model, loading it first if needed. The lock is held until
    /// `f` returns, so a concurrent call or [`ModelHandle::release`] waits for it.
    pub async fn with_model<R>(&self, f: impl FnOnce(&NativeModel) -> R) -> anyhow::Result<R> {
        let mut slot = self.model.lock().await;
        if let Some(model) = slot.as_ref() {
            return Ok(f(model));
        }
        let model = match self.load().await {
            Ok(model) => model,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "native model load failed");
                return Err(e);
            }
        };
        info!(
            path = %model.path().display(),
            dimension = model.n_embd(),
            "step: native model loaded"
        );
        Ok(f(slot.insert(model)))
    }

    /// Drops the loaded model, waiting for in-flight inference. The next call loads again.
    pub async fn release(&self) {
        let mut slot = self.model.lock().await;
        if let Some(model) = slot.take() {
            info!(path = %model.path().display(), "native model released");
        }
    }

    async fn load(&self) -> anyhow::Result<NativeModel> {
        let Some(path) = self.resolver.resolve() else {
            let searched: Vec<String> = self
                .resolver
                .searched_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            anyhow::bail!("model file not found; searched: [{}]", searched.join(", "));
        };
        NativeModel::load(&path).await
    }
}
