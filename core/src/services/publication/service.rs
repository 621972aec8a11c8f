//! Key publication and the key sources verifiers refresh from

use std::sync::Arc;

use async_trait::async_trait;

use super::jwks::JwkSet;
use crate::domain::entities::KeySet;
use crate::errors::KeyFetchError;
use crate::services::keys::KeyManager;

/// Where a verifier obtains its key set
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the current key set
    ///
    /// # Returns
    /// * `Ok(KeySet)` - Keys currently eligible for verification
    /// * `Err(KeyFetchError)` - The source could not be reached or decoded
    async fn fetch_key_set(&self) -> Result<KeySet, KeyFetchError>;

    /// In-process sources are read on every miss; remote ones are rate limited
    fn is_local(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T: KeySource + ?Sized> KeySource for Arc<T> {
    async fn fetch_key_set(&self) -> Result<KeySet, KeyFetchError> {
        (**self).fetch_key_set().await
    }

    fn is_local(&self) -> bool {
        (**self).is_local()
    }
}

/// Read-only publication of the key manager's public keys
pub struct KeyPublicationService {
    keys: Arc<KeyManager>,
}

impl KeyPublicationService {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    /// Public keys eligible for verification; symmetric keys never appear
    pub fn get_key_set(&self) -> KeySet {
        self.keys.public_key_set()
    }

    /// The key set as a JWKS document
    pub fn jwks(&self) -> JwkSet {
        JwkSet::from_key_set(&self.get_key_set())
    }

    /// Version of the published key set
    pub fn version(&self) -> u64 {
        self.keys.generation()
    }
}

#[async_trait]
impl KeySource for KeyPublicationService {
    async fn fetch_key_set(&self) -> Result<KeySet, KeyFetchError> {
        Ok(self.get_key_set())
    }

    fn is_local(&self) -> bool {
        true
    }
}

/// In-process source for a verifier co-located with the key manager
///
/// Unlike [`KeyPublicationService`] this includes symmetric keys, so it must
/// never back anything exposed outside the process.
pub struct LocalKeySource {
    keys: Arc<KeyManager>,
}

impl LocalKeySource {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for LocalKeySource {
    async fn fetch_key_set(&self) -> Result<KeySet, KeyFetchError> {
        Ok(self.keys.verification_key_set())
    }

    fn is_local(&self) -> bool {
        true
    }
}
