//! Cached, refreshable key set used by the token verifier
//!
//! - **TTL**: a key set older than `ttl` is refreshed on the next lookup
//! - **Coalescing**: callers that miss together share one fetch; the refresh
//!   gate only lets a fetch start if no other caller stored a new set while
//!   they were waiting
//! - **Rate limiting**: fetch attempts against a remote source are at least
//!   `min_refresh_interval` apart, so a flood of unknown `kid`s cannot hammer
//!   it. Local sources are re-read on every miss, so a freshly rotated key
//!   resolves immediately
//! - **Fallback**: when a fetch fails the last good set keeps serving until it
//!   is `max_stale` old

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::config::KeySetCacheConfig;
use crate::domain::entities::{KeySet, VerificationKey};
use crate::errors::{KeyFetchError, VerificationFailure};
use crate::services::publication::KeySource;

#[derive(Debug, Clone)]
struct CachedKeySet {
    set: Arc<KeySet>,
    fetched_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entry: Option<CachedKeySet>,
    /// Bumped each time a fetched set is stored
    generation: u64,
}

#[derive(Debug, Default)]
struct RefreshGate {
    last_attempt: Option<Instant>,
}

/// Read-mostly key set cache in front of a [`KeySource`]
pub struct KeySetCache {
    source: Arc<dyn KeySource>,
    config: KeySetCacheConfig,
    state: RwLock<CacheState>,
    gate: Mutex<RefreshGate>,
}

impl KeySetCache {
    pub fn new(source: Arc<dyn KeySource>, config: KeySetCacheConfig) -> Self {
        Self {
            source,
            config,
            state: RwLock::new(CacheState::default()),
            gate: Mutex::new(RefreshGate::default()),
        }
    }

    pub fn config(&self) -> &KeySetCacheConfig {
        &self.config
    }

    /// Resolve `kid`, refreshing on a miss or an expired set
    ///
    /// Fails with `UnknownKeyId` when the key is absent after a refresh, or
    /// when no key set young enough to use is available.
    pub async fn get_key(&self, kid: &str) -> Result<VerificationKey, VerificationFailure> {
        let (generation, entry) = self.snapshot();

        if let Some(cached) = &entry {
            if cached.fetched_at.elapsed() < self.config.ttl {
                if let Some(key) = cached.set.find(kid) {
                    return Ok(key.clone());
                }
                debug!("Key {} not in cached key set; refreshing", kid);
            }
        }

        let Some(cached) = self.refresh_if_unchanged(generation).await else {
            warn!("No key set available to resolve key {}", kid);
            return Err(VerificationFailure::UnknownKeyId);
        };

        let age = cached.fetched_at.elapsed();
        if age >= self.config.max_stale {
            warn!(
                "Cached key set is {}s old, past the {}s staleness limit",
                age.as_secs(),
                self.config.max_stale.as_secs()
            );
            return Err(VerificationFailure::UnknownKeyId);
        }
        if age >= self.config.ttl {
            debug!("Serving key {} from a stale key set ({}s old)", kid, age.as_secs());
        }

        cached
            .set
            .find(kid)
            .cloned()
            .ok_or(VerificationFailure::UnknownKeyId)
    }

    /// Fetch now, ignoring the TTL and the refresh rate limit
    pub async fn refresh(&self) -> Result<Arc<KeySet>, KeyFetchError> {
        let mut gate = self.gate.lock().await;
        gate.last_attempt = Some(Instant::now());
        self.fetch_and_store().await.map(|cached| cached.set)
    }

    /// Currently cached key set, regardless of age
    pub fn cached_key_set(&self) -> Option<Arc<KeySet>> {
        self.state.read().entry.as_ref().map(|cached| cached.set.clone())
    }

    /// Number of key sets stored so far
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    fn snapshot(&self) -> (u64, Option<CachedKeySet>) {
        let state = self.state.read();
        (state.generation, state.entry.clone())
    }

    /// Fetch unless someone stored a newer set while we waited for the gate,
    /// or the last attempt was too recent. Returns the best set available.
    async fn refresh_if_unchanged(&self, observed: u64) -> Option<CachedKeySet> {
        let mut gate = self.gate.lock().await;

        let (generation, entry) = self.snapshot();
        if generation != observed {
            return entry;
        }

        if let Some(last) = gate.last_attempt.filter(|_| !self.source.is_local()) {
            if last.elapsed() < self.config.min_refresh_interval {
                debug!("Key set refresh rate limited; using cached set");
                return entry;
            }
        }

        gate.last_attempt = Some(Instant::now());
        match self.fetch_and_store().await {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!("Key set refresh failed: {}", e);
                entry
            }
        }
    }

    /// Caller must hold the refresh gate
    async fn fetch_and_store(&self) -> Result<CachedKeySet, KeyFetchError> {
        let set = tokio::time::timeout(self.config.fetch_timeout, self.source.fetch_key_set())
            .await
            .map_err(|_| KeyFetchError::Timeout)??;

        let cached = CachedKeySet {
            set: Arc::new(set),
            fetched_at: Instant::now(),
        };

        {
            let mut state = self.state.write();
            state.entry = Some(cached.clone());
            state.generation += 1;
        }
        info!(
            "Key set refreshed: version {} with {} keys",
            cached.set.version(),
            cached.set.len()
        );

        Ok(cached)
    }
}
