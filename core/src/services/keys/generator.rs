//! Fresh key material for each supported algorithm

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use rand::RngCore;
use rand_core::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::domain::entities::signing_key::{MIN_HMAC_KEY_BITS, MIN_RSA_KEY_BITS};
use crate::domain::entities::{Algorithm, SigningKey, VerificationMaterial};
use crate::errors::KeyError;

/// PKCS#8 v1 prefix for a bare Ed25519 private key (RFC 8410)
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Generate a key of `algorithm` under identifier `kid`
///
/// `key_size` is the RSA modulus or HMAC secret size in bits and is ignored
/// for Ed25519.
pub fn generate(
    kid: String,
    algorithm: Algorithm,
    key_size: usize,
    created_at: DateTime<Utc>,
) -> Result<SigningKey, KeyError> {
    let (private, material) = match algorithm {
        Algorithm::Hs256 => generate_hmac(key_size)?,
        Algorithm::Rs256 => generate_rsa(key_size)?,
        Algorithm::EdDsa => generate_ed25519(),
    };

    Ok(SigningKey::new(kid, algorithm, private, material, created_at))
}

fn generate_hmac(bits: usize) -> Result<(Zeroizing<Vec<u8>>, VerificationMaterial), KeyError> {
    if bits < MIN_HMAC_KEY_BITS {
        return Err(KeyError::InvalidKeySize {
            algorithm: Algorithm::Hs256.to_string(),
            bits,
            minimum: MIN_HMAC_KEY_BITS,
        });
    }

    let mut secret = Zeroizing::new(vec![0u8; (bits + 7) / 8]);
    rand::thread_rng().fill_bytes(&mut secret);

    let material = VerificationMaterial::Shared(Arc::new(secret.clone()));
    Ok((secret, material))
}

fn generate_rsa(bits: usize) -> Result<(Zeroizing<Vec<u8>>, VerificationMaterial), KeyError> {
    if bits < MIN_RSA_KEY_BITS {
        return Err(KeyError::InvalidKeySize {
            algorithm: Algorithm::Rs256.to_string(),
            bits,
            minimum: MIN_RSA_KEY_BITS,
        });
    }

    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), bits).map_err(|e| {
        KeyError::Generation {
            message: format!("RSA key generation failed: {}", e),
        }
    })?;

    let der = private_key.to_pkcs1_der().map_err(|e| KeyError::Generation {
        message: format!("RSA key encoding failed: {}", e),
    })?;

    let material = VerificationMaterial::Rsa {
        n: URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be()),
    };

    Ok((Zeroizing::new(der.as_bytes().to_vec()), material))
}

fn generate_ed25519() -> (Zeroizing<Vec<u8>>, VerificationMaterial) {
    let signing_key = Ed25519SigningKey::generate(&mut OsRng);

    let mut der = Zeroizing::new(Vec::with_capacity(ED25519_PKCS8_PREFIX.len() + 32));
    der.extend_from_slice(&ED25519_PKCS8_PREFIX);
    der.extend_from_slice(signing_key.as_bytes());

    let material = VerificationMaterial::Ed25519 {
        x: URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes()),
    };

    (der, material)
}
