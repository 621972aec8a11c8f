//! Key manager owning the current signing key and its retired predecessors
//!
//! State lives in an immutable [`KeyRing`] snapshot. Rotation and purging
//! build a new snapshot and swap it in under a short write lock, so readers
//! holding the previous `Arc` never see a half-applied change.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{KeyIdStrategy, KeyManagerConfig};
use super::generator;
use crate::domain::entities::{Algorithm, KeySet, SigningKey, VerificationKey};
use crate::errors::KeyError;

/// Where a key sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// Signs new tokens
    Current,
    /// Verifies only, until the deadline
    Retired { verify_until: DateTime<Utc> },
}

#[derive(Debug, Clone)]
struct RetiredKey {
    key: Arc<SigningKey>,
    verify_until: DateTime<Utc>,
}

#[derive(Debug)]
struct KeyRing {
    current: Arc<SigningKey>,
    /// Newest first
    retired: Vec<RetiredKey>,
    generation: u64,
}

impl KeyRing {
    fn key_set(&self, now: DateTime<Utc>) -> KeySet {
        let mut set = KeySet::new(self.generation);
        let keys = std::iter::once(self.current.verification_key()).chain(
            self.retired
                .iter()
                .filter(|retired| retired.verify_until > now)
                .map(|retired| retired.key.verification_key()),
        );

        for key in keys {
            if let Err(err) = set.insert(key) {
                warn!("Skipping key while building key set: {}", err);
            }
        }
        set
    }
}

/// Key identifier allocator; an identifier is never handed out twice
#[derive(Debug)]
struct KeyIds {
    strategy: KeyIdStrategy,
    issued: Mutex<HashSet<String>>,
    sequence: AtomicU64,
}

impl KeyIds {
    fn new(strategy: KeyIdStrategy) -> Self {
        Self {
            strategy,
            issued: Mutex::new(HashSet::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn next(&self) -> String {
        let mut issued = self.issued.lock();
        loop {
            let kid = match self.strategy {
                KeyIdStrategy::Random => Uuid::new_v4().simple().to_string(),
                KeyIdStrategy::Sequential => {
                    (self.sequence.fetch_add(1, Ordering::SeqCst) + 1).to_string()
                }
            };
            if issued.insert(kid.clone()) {
                return kid;
            }
        }
    }
}

/// Thread-safe owner of all signing keys
pub struct KeyManager {
    config: KeyManagerConfig,
    ring: RwLock<Arc<KeyRing>>,
    kids: KeyIds,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.ring.read();
        f.debug_struct("KeyManager")
            .field("current_kid", &ring.current.kid())
            .field("retired", &ring.retired.len())
            .field("generation", &ring.generation)
            .finish()
    }
}

impl KeyManager {
    /// Create a manager with a freshly generated current key
    pub fn new(config: KeyManagerConfig) -> Result<Self, KeyError> {
        let kids = KeyIds::new(config.kid_strategy);
        let initial = generator::generate(kids.next(), config.algorithm, config.key_size, Utc::now())?;
        info!(
            "Key manager initialised with {} key {}",
            initial.algorithm(),
            initial.kid()
        );

        Ok(Self {
            config,
            ring: RwLock::new(Arc::new(KeyRing {
                current: Arc::new(initial),
                retired: Vec::new(),
                generation: 1,
            })),
            kids,
        })
    }

    pub fn config(&self) -> &KeyManagerConfig {
        &self.config
    }

    /// Generate a key with a never-before-used identifier
    ///
    /// The key is not installed; see [`KeyManager::rotate`].
    pub fn generate_key(&self, algorithm: Algorithm, key_size: usize) -> Result<SigningKey, KeyError> {
        let key = generator::generate(self.kids.next(), algorithm, key_size, Utc::now())?;
        debug!("Generated {} key {}", algorithm, key.kid());
        Ok(key)
    }

    /// The key new tokens are signed with
    pub fn current_signing_key(&self) -> Arc<SigningKey> {
        self.ring.read().current.clone()
    }

    /// Replace the current key, retiring the previous one for the grace period
    pub fn rotate(&self, algorithm: Option<Algorithm>) -> Result<Arc<SigningKey>, KeyError> {
        self.rotate_at(algorithm, Utc::now())
    }

    pub fn rotate_at(
        &self,
        algorithm: Option<Algorithm>,
        now: DateTime<Utc>,
    ) -> Result<Arc<SigningKey>, KeyError> {
        let algorithm = algorithm.unwrap_or_else(|| self.current_signing_key().algorithm());
        let key = Arc::new(self.generate_key(algorithm, self.config.key_size_for(algorithm))?);
        let verify_until = now + Duration::seconds(self.config.grace_period_seconds);

        let mut ring = self.ring.write();
        let mut retired = Vec::with_capacity(ring.retired.len() + 1);
        retired.push(RetiredKey {
            key: Arc::new(ring.current.retired()),
            verify_until,
        });
        retired.extend(ring.retired.iter().cloned());

        let previous = ring.current.kid().to_string();
        let next = Arc::new(KeyRing {
            current: key.clone(),
            retired,
            generation: ring.generation + 1,
        });
        *ring = next;
        drop(ring);

        info!(
            "Rotated signing key {} -> {}; previous key verifies until {}",
            previous,
            key.kid(),
            verify_until
        );
        Ok(key)
    }

    /// Publishable verification keys: current plus unexpired retired keys
    ///
    /// Symmetric keys are never included.
    pub fn public_key_set(&self) -> KeySet {
        self.public_key_set_at(Utc::now())
    }

    pub fn public_key_set_at(&self, now: DateTime<Utc>) -> KeySet {
        self.verification_key_set_at(now).publishable()
    }

    /// Every key a co-located verifier may trust, symmetric keys included
    pub fn verification_key_set(&self) -> KeySet {
        self.verification_key_set_at(Utc::now())
    }

    pub fn verification_key_set_at(&self, now: DateTime<Utc>) -> KeySet {
        let ring = self.ring.read().clone();
        ring.key_set(now)
    }

    /// Public view of one key, if it is still eligible for verification
    pub fn verification_key(&self, kid: &str) -> Option<VerificationKey> {
        self.verification_key_set().find(kid).cloned()
    }

    /// Drop retired keys whose grace period has elapsed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut ring = self.ring.write();
        let (kept, purged): (Vec<_>, Vec<_>) = ring
            .retired
            .iter()
            .cloned()
            .partition(|retired| retired.verify_until > now);

        if purged.is_empty() {
            return 0;
        }

        let next = Arc::new(KeyRing {
            current: ring.current.clone(),
            retired: kept,
            generation: ring.generation + 1,
        });
        *ring = next;
        drop(ring);

        for retired in &purged {
            debug!("Purged retired key {}", retired.key.kid());
        }
        purged.len()
    }

    pub fn key_status(&self, kid: &str) -> Option<KeyStatus> {
        let ring = self.ring.read().clone();
        if ring.current.kid() == kid {
            return Some(KeyStatus::Current);
        }
        ring.retired
            .iter()
            .find(|retired| retired.key.kid() == kid)
            .map(|retired| KeyStatus::Retired {
                verify_until: retired.verify_until,
            })
    }

    /// Number of retired keys still held
    pub fn retired_count(&self) -> usize {
        self.ring.read().retired.len()
    }

    /// Increases on every rotation and purge
    pub fn generation(&self) -> u64 {
        self.ring.read().generation
    }
}
