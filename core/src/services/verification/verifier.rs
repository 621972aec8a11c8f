//! Bearer token verification
//!
//! Verification runs in a fixed order: parse, resolve the key by `kid`,
//! check the signature over the received bytes, then validate claims. The
//! first failing step decides the rejection reason.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cache::KeySetCache;
use super::config::TokenVerifierConfig;
use crate::domain::entities::{Algorithm, Claims, Principal, VerificationKey};
use crate::domain::value_objects::VerificationResult;
use crate::errors::VerificationFailure;
use crate::services::token::{DecodedToken, TokenCodec};

/// Verifies bearer tokens against a cached key set
pub struct TokenVerifier {
    cache: Arc<KeySetCache>,
    config: TokenVerifierConfig,
}

impl TokenVerifier {
    pub fn new(cache: Arc<KeySetCache>, config: TokenVerifierConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &Arc<KeySetCache> {
        &self.cache
    }

    /// Verify a compact token
    pub async fn verify(&self, token: &str) -> VerificationResult {
        self.verify_at(token, Utc::now().timestamp()).await
    }

    /// Verify as of `now` (seconds since the epoch)
    pub async fn verify_at(&self, token: &str, now: i64) -> VerificationResult {
        let result = self.check(token, now).await;
        if let Err(reason) = &result {
            debug!("Rejected bearer token: {}", reason);
        }
        result.into()
    }

    async fn check(&self, token: &str, now: i64) -> Result<Principal, VerificationFailure> {
        let decoded = TokenCodec::decode_unverified(token)?;
        let key = self.cache.get_key(&decoded.kid).await?;
        Self::verify_signature(&decoded, &key)?;
        self.validate_claims(decoded.claims, now, decoded.kid)
    }

    /// The header must name the key's own algorithm; anything else is treated
    /// as a bad signature.
    fn verify_signature(decoded: &DecodedToken, key: &VerificationKey) -> Result<(), VerificationFailure> {
        let algorithm: Algorithm = decoded
            .header
            .alg
            .parse()
            .map_err(|_| VerificationFailure::BadSignature)?;

        if algorithm != key.algorithm {
            warn!(
                "Token header declares {} but key {} is {}",
                algorithm, key.kid, key.algorithm
            );
            return Err(VerificationFailure::BadSignature);
        }

        let decoding_key = key.material.decoding_key().map_err(|e| {
            warn!("Unusable verification material for key {}: {}", key.kid, e);
            VerificationFailure::BadSignature
        })?;

        match jsonwebtoken::crypto::verify(
            &decoded.signature,
            decoded.signing_input.as_bytes(),
            &decoding_key,
            algorithm.jwt_algorithm(),
        ) {
            Ok(true) => Ok(()),
            _ => Err(VerificationFailure::BadSignature),
        }
    }

    fn validate_claims(
        &self,
        claims: Map<String, Value>,
        now: i64,
        kid: String,
    ) -> Result<Principal, VerificationFailure> {
        if let Some(exp) = claims.get("exp") {
            let exp = exp.as_i64().ok_or(VerificationFailure::MalformedToken)?;
            if exp.saturating_add(self.config.clock_skew) < now {
                return Err(VerificationFailure::ExpiredToken);
            }
        }

        if let Some(claim) = self
            .config
            .required_claims
            .iter()
            .find(|claim| claims.get(claim.as_str()).map_or(true, Value::is_null))
        {
            return Err(VerificationFailure::MissingRequiredClaim {
                claim: claim.clone(),
            });
        }

        if let Some(expected) = &self.config.expected_issuer {
            if claims.get("iss").and_then(Value::as_str) != Some(expected.as_str()) {
                return Err(VerificationFailure::MissingRequiredClaim {
                    claim: "iss".to_string(),
                });
            }
        }

        let claims: Claims = serde_json::from_value(Value::Object(claims))
            .map_err(|_| VerificationFailure::MalformedToken)?;
        Principal::from_claims(claims, kid)
    }
}
