//! Verification keys and the key set handed to verifiers.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::signing_key::Algorithm;
use crate::errors::KeyError;

/// Public (or, for HMAC, shared) material needed to check a signature
///
/// RSA and Ed25519 components are base64url without padding, the same form
/// they take in a JWKS document.
#[derive(Clone)]
pub enum VerificationMaterial {
    Rsa { n: String, e: String },
    Ed25519 { x: String },
    Shared(Arc<Zeroizing<Vec<u8>>>),
}

impl VerificationMaterial {
    /// Symmetric secrets must never leave the process
    pub fn is_publishable(&self) -> bool {
        !matches!(self, VerificationMaterial::Shared(_))
    }

    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        match self {
            VerificationMaterial::Rsa { n, e } => DecodingKey::from_rsa_components(n, e),
            VerificationMaterial::Ed25519 { x } => DecodingKey::from_ed_components(x),
            VerificationMaterial::Shared(secret) => Ok(DecodingKey::from_secret(secret.as_slice())),
        }
    }
}

impl PartialEq for VerificationMaterial {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                VerificationMaterial::Rsa { n, e },
                VerificationMaterial::Rsa { n: other_n, e: other_e },
            ) => n == other_n && e == other_e,
            (VerificationMaterial::Ed25519 { x }, VerificationMaterial::Ed25519 { x: other_x }) => {
                x == other_x
            }
            (VerificationMaterial::Shared(a), VerificationMaterial::Shared(b)) => {
                a.as_slice() == b.as_slice()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for VerificationMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationMaterial::Rsa { n, e } => f
                .debug_struct("Rsa")
                .field("n", n)
                .field("e", e)
                .finish(),
            VerificationMaterial::Ed25519 { x } => f.debug_struct("Ed25519").field("x", x).finish(),
            VerificationMaterial::Shared(_) => f.write_str("Shared([REDACTED])"),
        }
    }
}

/// The verification half of a signing key
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationKey {
    pub kid: String,
    pub algorithm: Algorithm,
    pub material: VerificationMaterial,
    pub created_at: DateTime<Utc>,
}

impl VerificationKey {
    pub fn new(
        kid: impl Into<String>,
        algorithm: Algorithm,
        material: VerificationMaterial,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kid: kid.into(),
            algorithm,
            material,
            created_at,
        }
    }

    pub fn is_publishable(&self) -> bool {
        self.material.is_publishable()
    }
}

/// Ordered, versioned set of verification keys with unique identifiers
///
/// Keys are listed current first, then retired keys newest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeySet {
    version: u64,
    keys: Vec<VerificationKey>,
}

impl KeySet {
    /// Empty key set at a version
    pub fn new(version: u64) -> Self {
        Self {
            version,
            keys: Vec::new(),
        }
    }

    /// Build a key set, rejecting duplicate identifiers
    pub fn from_keys(
        version: u64,
        keys: impl IntoIterator<Item = VerificationKey>,
    ) -> Result<Self, KeyError> {
        let mut set = Self::new(version);
        for key in keys {
            set.insert(key)?;
        }
        Ok(set)
    }

    /// Append a key; an identifier already present is an error
    pub fn insert(&mut self, key: VerificationKey) -> Result<(), KeyError> {
        if self.find(&key.kid).is_some() {
            return Err(KeyError::DuplicateKeyId { kid: key.kid });
        }
        self.keys.push(key);
        Ok(())
    }

    pub fn find(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.find(kid).is_some()
    }

    pub fn kids(&self) -> Vec<&str> {
        self.keys.iter().map(|key| key.kid.as_str()).collect()
    }

    pub fn keys(&self) -> &[VerificationKey] {
        &self.keys
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Digest of the keys in order, independent of `version`
    ///
    /// Two sets share a fingerprint only if they hold the same identifiers,
    /// algorithms and public material. Shared secrets contribute their
    /// identifier and algorithm only.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for key in &self.keys {
            hasher.update(key.kid.as_bytes());
            hasher.update([0u8]);
            hasher.update(key.algorithm.as_str().as_bytes());
            hasher.update([0u8]);
            match &key.material {
                VerificationMaterial::Rsa { n, e } => {
                    hasher.update(n.as_bytes());
                    hasher.update([0u8]);
                    hasher.update(e.as_bytes());
                }
                VerificationMaterial::Ed25519 { x } => hasher.update(x.as_bytes()),
                VerificationMaterial::Shared(_) => {}
            }
            hasher.update([0xffu8]);
        }
        hex::encode(&hasher.finalize()[..16])
    }

    /// Same set with symmetric keys removed
    pub fn publishable(&self) -> KeySet {
        KeySet {
            version: self.version,
            keys: self
                .keys
                .iter()
                .filter(|key| key.is_publishable())
                .cloned()
                .collect(),
        }
    }
}
