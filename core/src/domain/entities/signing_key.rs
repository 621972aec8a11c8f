//! Signing keys and the algorithms they are used with.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::EncodingKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::key_set::{VerificationKey, VerificationMaterial};
use crate::errors::{KeyError, SigningFailure};

/// Smallest accepted RSA modulus
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Smallest accepted HMAC secret
pub const MIN_HMAC_KEY_BITS: usize = 256;

/// Signature algorithms a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC with SHA-256 (symmetric, never published)
    #[serde(rename = "HS256")]
    Hs256,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    #[serde(rename = "RS256")]
    Rs256,
    /// Ed25519
    #[serde(rename = "EdDSA")]
    EdDsa,
}

impl Algorithm {
    /// Name used in the `alg` header and JWKS entries
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hs256 => "HS256",
            Algorithm::Rs256 => "RS256",
            Algorithm::EdDsa => "EdDSA",
        }
    }

    pub fn is_symmetric(&self) -> bool {
        matches!(self, Algorithm::Hs256)
    }

    /// The jsonwebtoken algorithm used for signing and verification
    pub fn jwt_algorithm(&self) -> jsonwebtoken::Algorithm {
        match self {
            Algorithm::Hs256 => jsonwebtoken::Algorithm::HS256,
            Algorithm::Rs256 => jsonwebtoken::Algorithm::RS256,
            Algorithm::EdDsa => jsonwebtoken::Algorithm::EdDSA,
        }
    }

    /// Key size used when the caller does not ask for one
    pub fn default_key_size(&self) -> usize {
        match self {
            Algorithm::Hs256 => MIN_HMAC_KEY_BITS,
            Algorithm::Rs256 => MIN_RSA_KEY_BITS,
            Algorithm::EdDsa => 256,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(Algorithm::Hs256),
            "RS256" => Ok(Algorithm::Rs256),
            "EdDSA" => Ok(Algorithm::EdDsa),
            other => Err(KeyError::UnsupportedAlgorithm {
                algorithm: other.to_string(),
            }),
        }
    }
}

/// What a key may currently be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUsage {
    Signing,
    Verification,
}

/// A key owned by the key manager
///
/// The private material is a DER document (PKCS#1 for RSA, PKCS#8 for
/// Ed25519) or the raw HMAC secret. It is zeroized on drop and never shown
/// by `Debug`. A key is never mutated after creation; retiring produces a
/// new verification-only value.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    algorithm: Algorithm,
    private: Zeroizing<Vec<u8>>,
    material: VerificationMaterial,
    usage: KeyUsage,
    created_at: DateTime<Utc>,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("usage", &self.usage)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    pub fn new(
        kid: impl Into<String>,
        algorithm: Algorithm,
        private: Zeroizing<Vec<u8>>,
        material: VerificationMaterial,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kid: kid.into(),
            algorithm,
            private,
            material,
            usage: KeyUsage::Signing,
            created_at,
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn usage(&self) -> KeyUsage {
        self.usage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn material(&self) -> &VerificationMaterial {
        &self.material
    }

    /// Copy of this key that can only verify; private material is dropped
    pub fn retired(&self) -> Self {
        Self {
            kid: self.kid.clone(),
            algorithm: self.algorithm,
            private: Zeroizing::new(Vec::new()),
            material: self.material.clone(),
            usage: KeyUsage::Verification,
            created_at: self.created_at,
        }
    }

    /// Public view of this key
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey::new(
            self.kid.clone(),
            self.algorithm,
            self.material.clone(),
            self.created_at,
        )
    }

    /// Key handed to `jsonwebtoken::crypto::sign`
    pub fn encoding_key(&self) -> Result<EncodingKey, SigningFailure> {
        if self.usage != KeyUsage::Signing {
            return Err(SigningFailure::KeyUnavailable {
                message: format!("key {} is retired", self.kid),
            });
        }

        match self.algorithm {
            Algorithm::Hs256 => Ok(EncodingKey::from_secret(&self.private)),
            Algorithm::Rs256 => Ok(EncodingKey::from_rsa_der(&self.private)),
            Algorithm::EdDsa => Ok(EncodingKey::from_ed_der(&self.private)),
        }
    }
}
