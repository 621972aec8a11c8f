//! JSON Web Key Set documents (RFC 7517)
//!
//! Only asymmetric keys are ever converted to JWKs. A symmetric key has no
//! public half, so it has no JWK form here.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::{Algorithm, KeySet, VerificationKey, VerificationMaterial};
use crate::errors::KeyError;

/// `use` value for signature keys
pub const KEY_USE_SIGNATURE: &str = "sig";

/// A single JSON Web Key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: "RSA" or "OKP"
    pub kty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Curve for OKP keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// RSA modulus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// OKP public key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
}

impl Jwk {
    /// JWK for a verification key; `None` for symmetric keys
    pub fn from_verification_key(key: &VerificationKey) -> Option<Self> {
        let base = Jwk {
            kty: String::new(),
            kid: Some(key.kid.clone()),
            key_use: Some(KEY_USE_SIGNATURE.to_string()),
            alg: Some(key.algorithm.as_str().to_string()),
            crv: None,
            n: None,
            e: None,
            x: None,
        };

        match &key.material {
            VerificationMaterial::Rsa { n, e } => Some(Jwk {
                kty: "RSA".to_string(),
                n: Some(n.clone()),
                e: Some(e.clone()),
                ..base
            }),
            VerificationMaterial::Ed25519 { x } => Some(Jwk {
                kty: "OKP".to_string(),
                crv: Some("Ed25519".to_string()),
                x: Some(x.clone()),
                ..base
            }),
            VerificationMaterial::Shared(_) => None,
        }
    }

    /// Verification key described by this JWK
    pub fn to_verification_key(&self) -> Result<VerificationKey, KeyError> {
        let kid = self.kid.clone().ok_or_else(|| KeyError::InvalidMaterial {
            kid: String::new(),
            message: "JWK has no kid".to_string(),
        })?;
        let invalid = |message: &str| KeyError::InvalidMaterial {
            kid: kid.clone(),
            message: message.to_string(),
        };

        let (algorithm, material) = match (self.kty.as_str(), self.crv.as_deref()) {
            ("RSA", _) => {
                let n = self.n.clone().ok_or_else(|| invalid("RSA key without n"))?;
                let e = self.e.clone().ok_or_else(|| invalid("RSA key without e"))?;
                (Algorithm::Rs256, VerificationMaterial::Rsa { n, e })
            }
            ("OKP", Some("Ed25519")) => {
                let x = self.x.clone().ok_or_else(|| invalid("OKP key without x"))?;
                (Algorithm::EdDsa, VerificationMaterial::Ed25519 { x })
            }
            (kty, crv) => {
                return Err(KeyError::UnsupportedAlgorithm {
                    algorithm: format!("{}{}", kty, crv.map(|c| format!("/{}", c)).unwrap_or_default()),
                })
            }
        };

        // A declared algorithm must agree with the key type
        if let Some(alg) = self.alg.as_deref() {
            let declared: Algorithm = alg.parse()?;
            if declared != algorithm {
                return Err(invalid(&format!("alg {} does not match kty {}", alg, self.kty)));
            }
        }

        Ok(VerificationKey::new(kid, algorithm, material, Utc::now()))
    }
}

/// A JWKS document: `{"keys": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Publish a key set; symmetric keys are dropped
    pub fn from_key_set(set: &KeySet) -> Self {
        Self {
            keys: set
                .keys()
                .iter()
                .filter_map(Jwk::from_verification_key)
                .collect(),
        }
    }

    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|jwk| jwk.kid.as_deref() == Some(kid))
    }

    /// Convert to a key set at `version`
    ///
    /// Keys meant for encryption or of unsupported types are skipped with a
    /// warning; a repeated `kid` fails the whole document.
    pub fn into_key_set(self, version: u64) -> Result<KeySet, KeyError> {
        let mut set = KeySet::new(version);
        for jwk in &self.keys {
            if jwk
                .key_use
                .as_deref()
                .is_some_and(|key_use| key_use != KEY_USE_SIGNATURE)
            {
                continue;
            }
            match jwk.to_verification_key() {
                Ok(key) => set.insert(key)?,
                Err(e) => warn!("Skipping JWK: {}", e),
            }
        }
        Ok(set)
    }
}

impl From<&KeySet> for JwkSet {
    fn from(set: &KeySet) -> Self {
        Self::from_key_set(set)
    }
}
