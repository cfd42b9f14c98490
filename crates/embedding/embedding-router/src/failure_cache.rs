//! Time-bounded memory of providers that recently failed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use embedding::ProviderId;
use tokio::time::Instant;

/// Providers that failed within `ttl` are skipped by an [`crate::AutoSelector`] that holds
/// this cache. Owned by whoever builds the selector; never process-global.
#[derive(Debug)]
pub struct FailureCache {
    ttl: Duration,
    failures: Mutex<HashMap<ProviderId, Instant>>,
}

impl FailureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn record_failure(&self, provider: ProviderId) {
        self.lock().insert(provider, Instant::now());
    }

    /// Time since `provider` last failed, if that is within the TTL. Expired entries are dropped.
    pub fn recent_failure(&self, provider: ProviderId) -> Option<Duration> {
        let mut failures = self.lock();
        let elapsed = failures.get(&provider)?.elapsed();
        if elapsed < self.ttl {
            return Some(elapsed);
        }
        failures.remove(&provider);
        None
    }

    pub fn clear(&self, provider: ProviderId) {
        self.lock().remove(&provider);
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ProviderId, Instant>> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }
}
