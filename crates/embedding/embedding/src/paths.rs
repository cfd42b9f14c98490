//! Locates a named resource (e.g. a local model file) across several install layouts.
//!
//! Candidates are evaluated in order and the first one that exists wins.

use std::env;
use std::path::{Path, PathBuf};

/// One place a resource might live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCandidate {
    /// Path taken from an environment variable (ignored when unset or empty).
    Env(String),
    /// Path used as given; relative paths are joined to the current directory.
    Fixed(PathBuf),
    /// Path under the user's home directory (`$HOME`, or `%USERPROFILE%` on Windows).
    HomeRelative(PathBuf),
}

impl PathCandidate {
    /// Absolute path this candidate points at, if it can be formed.
    pub fn expand(&self) -> Option<PathBuf> {
        match self {
            PathCandidate::Env(var) => env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| absolutize(Path::new(v.trim()))),
            PathCandidate::Fixed(path) => Some(absolutize(path)),
            PathCandidate::HomeRelative(path) => home_dir().map(|home| home.join(path)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    candidates: Vec<PathCandidate>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate(mut self, candidate: PathCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn env(self, var: impl Into<String>) -> Self {
        self.candidate(PathCandidate::Env(var.into()))
    }

    pub fn fixed(self, path: impl Into<PathBuf>) -> Self {
        self.candidate(PathCandidate::Fixed(path.into()))
    }

    pub fn home_relative(self, path: impl Into<PathBuf>) -> Self {
        self.candidate(PathCandidate::HomeRelative(path.into()))
    }

    pub fn candidates(&self) -> &[PathCandidate] {
        &self.candidates
    }

    /// Expanded paths in evaluation order, for diagnostics.
    pub fn searched_paths(&self) -> Vec<PathBuf> {
        self.candidates.iter().filter_map(PathCandidate::expand).collect()
    }

    /// First candidate that exists on disk.
    pub fn resolve(&self) -> Option<PathBuf> {
        self.candidates
            .iter()
            .filter_map(PathCandidate::expand)
            .find(|path| path.exists())
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = dir.path().join("b.gguf");
        let third = dir.path().join("c.gguf");
        std::fs::write(&second, b"x").unwrap();
        std::fs::write(&third, b"x").unwrap();

        let resolver = PathResolver::new()
            .fixed(dir.path().join("a.gguf"))
            .fixed(&second)
            .fixed(&third);
        assert_eq!(resolver.resolve(), Some(second));
    }

    #[test]
    fn nothing_existing_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new().fixed(dir.path().join("missing.gguf"));
        assert_eq!(resolver.resolve(), None);
        assert_eq!(resolver.searched_paths().len(), 1);
    }

    #[test]
    #[serial]
    fn env_candidate_is_used_when_set() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.gguf");
        std::fs::write(&model, b"x").unwrap();

        env::set_var("PATHS_TEST_MODEL", &model);
        let resolver = PathResolver::new().env("PATHS_TEST_MODEL");
        assert_eq!(resolver.resolve(), Some(model));

        env::set_var("PATHS_TEST_MODEL", "");
        assert_eq!(resolver.resolve(), None);
        env::remove_var("PATHS_TEST_MODEL");
    }

    #[test]
    fn relative_fixed_paths_become_absolute() {
        let expanded = PathCandidate::Fixed(PathBuf::from("models/x.gguf"))
            .expand()
            .unwrap();
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("models/x.gguf"));
    }
}
