//! Tests for bearer token verification

use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::domain::entities::{Algorithm, Claims, SigningKey, TokenHeader};
use crate::domain::value_objects::VerificationResult;
use crate::errors::VerificationFailure;
use crate::services::keys::{KeyManager, KeyManagerConfig};
use crate::services::publication::LocalKeySource;
use crate::services::token::TokenCodec;
use crate::services::verification::{
    KeySetCache, KeySetCacheConfig, TokenVerifier, TokenVerifierConfig,
};

const ISSUER: &str = "keygate";

fn manager(algorithm: Algorithm) -> Arc<KeyManager> {
    Arc::new(KeyManager::new(KeyManagerConfig::new(algorithm).with_grace_period(600)).unwrap())
}

fn verifier(keys: &Arc<KeyManager>, clock_skew: i64) -> TokenVerifier {
    let cache = KeySetCache::new(
        Arc::new(LocalKeySource::new(keys.clone())),
        KeySetCacheConfig {
            min_refresh_interval: StdDuration::ZERO,
            ..KeySetCacheConfig::default()
        },
    );
    TokenVerifier::new(
        Arc::new(cache),
        TokenVerifierConfig::default()
            .with_issuer(ISSUER)
            .with_clock_skew(clock_skew),
    )
}

fn claims(subject: &str, scope: &str, now: i64, exp: i64) -> Claims {
    Claims::new(subject, ISSUER, now, exp, scope)
}

fn sign(claims: &Claims, key: &SigningKey) -> String {
    TokenCodec::sign(claims, key).unwrap().into_string()
}

/// Sign arbitrary header and claims JSON with `key`
fn sign_raw(header: Value, claims: Value, key: &SigningKey) -> String {
    let input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );
    let signature = jsonwebtoken::crypto::sign(
        input.as_bytes(),
        &key.encoding_key().unwrap(),
        key.algorithm().jwt_algorithm(),
    )
    .unwrap();
    format!("{}.{}", input, signature)
}

fn rejection(result: VerificationResult) -> VerificationFailure {
    result.into_result().unwrap_err()
}

#[tokio::test]
async fn test_new_key_verifies_right_after_rotation_with_default_cache() {
    let keys = manager(Algorithm::Hs256);
    let cache = KeySetCache::new(
        Arc::new(LocalKeySource::new(keys.clone())),
        KeySetCacheConfig::default(),
    );
    let verifier = TokenVerifier::new(
        Arc::new(cache),
        TokenVerifierConfig::default().with_issuer(ISSUER),
    );
    let now = Utc::now().timestamp();
    let claims = claims("svc", "read", now, now + 900);

    let before = sign(&claims, &keys.current_signing_key());
    assert!(verifier.verify(&before).await.is_valid());

    keys.rotate(None).unwrap();
    let after = sign(&claims, &keys.current_signing_key());
    let principal = verifier.verify(&after).await.into_result().unwrap();
    assert_eq!(principal.key_id, keys.current_signing_key().kid());
    assert!(verifier.verify(&before).await.is_valid());
}

#[tokio::test]
async fn test_round_trip_for_every_algorithm() {
    for algorithm in [Algorithm::Hs256, Algorithm::EdDsa, Algorithm::Rs256] {
        let keys = manager(algorithm);
        let verifier = verifier(&keys, 60);
        let now = Utc::now().timestamp();
        let mut issued = claims("svc", "read write", now, now + 900);
        issued.jti = Some("jti-1".to_string());
        issued.extra.insert("tenant".to_string(), json!("acme"));

        let token = sign(&issued, &keys.current_signing_key());
        let principal = verifier.verify(&token).await.into_result().unwrap();

        assert_eq!(principal.claims, issued, "{}", algorithm);
        assert_eq!(principal.key_id, keys.current_signing_key().kid());
    }
}

#[tokio::test]
async fn test_alice_read_scenario() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now().timestamp();
    let token = sign(&claims("alice", "read", now, now + 900), &keys.current_signing_key());

    let result = verifier(&keys, 60).verify(&token).await;
    assert!(result.is_valid());
    let principal = result.principal().unwrap();
    assert_eq!(principal.subject, "alice");
    assert_eq!(principal.scopes, vec!["read"]);
    assert_eq!(principal.issuer, ISSUER);
}

#[tokio::test]
async fn test_expiry_boundary() {
    let keys = manager(Algorithm::EdDsa);
    let key = keys.current_signing_key();
    let verifier = verifier(&keys, 0);
    let now = Utc::now().timestamp();

    let expired = sign(&claims("alice", "read", now - 900, now - 1), &key);
    assert_eq!(
        rejection(verifier.verify_at(&expired, now).await),
        VerificationFailure::ExpiredToken
    );

    let live = sign(&claims("alice", "read", now - 900, now + 1), &key);
    assert!(verifier.verify_at(&live, now).await.is_valid());
}

#[tokio::test]
async fn test_clock_skew_is_tolerated() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now().timestamp();
    let token = sign(&claims("alice", "read", now - 900, now - 30), &keys.current_signing_key());

    let verifier = verifier(&keys, 60);
    assert!(verifier.verify_at(&token, now).await.is_valid());
    assert_eq!(
        rejection(verifier.verify_at(&token, now + 31).await),
        VerificationFailure::ExpiredToken
    );
}

#[tokio::test]
async fn test_previous_key_verifies_during_grace_period() {
    let keys = manager(Algorithm::EdDsa);
    let verifier = verifier(&keys, 60);
    let now = Utc::now().timestamp();
    let old_token = sign(&claims("alice", "read", now, now + 900), &keys.current_signing_key());
    assert!(verifier.verify(&old_token).await.is_valid());

    let rotated = keys.rotate(None).unwrap();
    let new_token = sign(&claims("alice", "read", now, now + 900), &rotated);

    assert!(verifier.verify(&old_token).await.is_valid());
    // New kid is unknown to the cached set and found by a forced refresh
    assert!(verifier.verify(&new_token).await.is_valid());
}

#[tokio::test]
async fn test_previous_key_rejected_after_grace_period() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now();
    let old_token = sign(
        &claims("alice", "read", now.timestamp(), now.timestamp() + 900),
        &keys.current_signing_key(),
    );

    keys.rotate_at(None, now - Duration::seconds(601)).unwrap();

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&old_token).await),
        VerificationFailure::UnknownKeyId
    );
}

#[tokio::test]
async fn test_algorithm_confusion_is_rejected() {
    let keys = manager(Algorithm::EdDsa);
    let verifier = verifier(&keys, 60);
    let ed_kid = keys.current_signing_key().kid().to_string();
    let now = Utc::now().timestamp();
    let claims = claims("mallory", "read", now, now + 900);

    // HMAC-signed token claiming to be verifiable with the Ed25519 key
    let hmac = manager(Algorithm::Hs256).current_signing_key();
    let forged = TokenCodec::encode(&TokenHeader::new("HS256", ed_kid.clone()), &claims, &hmac)
        .unwrap()
        .into_string();
    assert_eq!(
        rejection(verifier.verify(&forged).await),
        VerificationFailure::BadSignature
    );

    // Header claims EdDSA over a valid HMAC signature
    let relabeled = TokenCodec::encode(&TokenHeader::new("EdDSA", ed_kid.clone()), &claims, &hmac)
        .unwrap()
        .into_string();
    assert_eq!(
        rejection(verifier.verify(&relabeled).await),
        VerificationFailure::BadSignature
    );

    let unsigned = sign_raw(
        json!({"alg": "none", "kid": ed_kid}),
        serde_json::to_value(&claims).unwrap(),
        &hmac,
    );
    assert_eq!(
        rejection(verifier.verify(&unsigned).await),
        VerificationFailure::BadSignature
    );
}

#[tokio::test]
async fn test_unknown_kid() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now().timestamp();
    let token = TokenCodec::encode(
        &TokenHeader::new("EdDSA", "99"),
        &claims("alice", "read", now, now + 900),
        &keys.current_signing_key(),
    )
    .unwrap();

    assert_eq!(
        rejection(verifier(&keys, 60).verify(token.as_str()).await),
        VerificationFailure::UnknownKeyId
    );
}

#[tokio::test]
async fn test_tampered_signature() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now().timestamp();
    let token = sign(&claims("alice", "read", now, now + 900), &keys.current_signing_key());

    let (input, signature) = token.rsplit_once('.').unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
    bytes[10] ^= 0x01;
    let tampered = format!("{}.{}", input, URL_SAFE_NO_PAD.encode(bytes));

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&tampered).await),
        VerificationFailure::BadSignature
    );
}

#[tokio::test]
async fn test_tampered_claims() {
    let keys = manager(Algorithm::Hs256);
    let now = Utc::now().timestamp();
    let token = sign(&claims("alice", "read", now, now + 900), &keys.current_signing_key());

    let segments: Vec<&str> = token.split('.').collect();
    let escalated = URL_SAFE_NO_PAD.encode(
        serde_json::to_string(&claims("alice", "read admin", now, now + 900)).unwrap(),
    );
    let tampered = format!("{}.{}.{}", segments[0], escalated, segments[2]);

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&tampered).await),
        VerificationFailure::BadSignature
    );
}

#[tokio::test]
async fn test_missing_required_claim() {
    let keys = manager(Algorithm::EdDsa);
    let key = keys.current_signing_key();
    let now = Utc::now().timestamp();

    let token = sign_raw(
        json!({"alg": "EdDSA", "kid": key.kid()}),
        json!({"sub": "alice", "iss": ISSUER, "iat": now, "exp": now + 900}),
        &key,
    );

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&token).await),
        VerificationFailure::MissingRequiredClaim {
            claim: "scope".to_string()
        }
    );
}

#[tokio::test]
async fn test_configured_required_claims_decide_what_may_be_absent() {
    let keys = manager(Algorithm::EdDsa);
    let key = keys.current_signing_key();
    let now = Utc::now().timestamp();
    let token = sign_raw(
        json!({"alg": "EdDSA", "kid": key.kid()}),
        json!({"sub": "alice", "iss": ISSUER, "exp": now + 900, "scope": "read"}),
        &key,
    );

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&token).await),
        VerificationFailure::MissingRequiredClaim {
            claim: "iat".to_string()
        }
    );

    let cache = KeySetCache::new(
        Arc::new(LocalKeySource::new(keys.clone())),
        KeySetCacheConfig::default(),
    );
    let lenient = TokenVerifier::new(
        Arc::new(cache),
        TokenVerifierConfig {
            required_claims: vec!["sub".to_string(), "exp".to_string()],
            ..TokenVerifierConfig::default()
        }
        .with_issuer(ISSUER),
    );
    let principal = lenient.verify(&token).await.into_result().unwrap();
    assert_eq!(principal.subject, "alice");
    assert!(principal.issued_at.is_none());
    assert_eq!(principal.expires_at.unwrap().timestamp(), now + 900);
}

#[tokio::test]
async fn test_array_audience_is_accepted() {
    let keys = manager(Algorithm::EdDsa);
    let key = keys.current_signing_key();
    let now = Utc::now().timestamp();
    let token = sign_raw(
        json!({"alg": "EdDSA", "kid": key.kid()}),
        json!({
            "sub": "alice",
            "iss": ISSUER,
            "iat": now,
            "exp": now + 900,
            "scope": "read",
            "aud": ["orders", "billing"]
        }),
        &key,
    );

    let principal = verifier(&keys, 60).verify(&token).await.into_result().unwrap();
    let audience = principal.claims.aud.unwrap();
    assert!(audience.contains("billing"));
    assert!(!audience.contains("payroll"));
}

#[tokio::test]
async fn test_issuer_mismatch() {
    let keys = manager(Algorithm::EdDsa);
    let now = Utc::now().timestamp();
    let mut foreign = claims("alice", "read", now, now + 900);
    foreign.iss = "someone-else".to_string();
    let token = sign(&foreign, &keys.current_signing_key());

    assert_eq!(
        rejection(verifier(&keys, 60).verify(&token).await),
        VerificationFailure::MissingRequiredClaim {
            claim: "iss".to_string()
        }
    );
}

#[tokio::test]
async fn test_wrongly_typed_claims_are_malformed() {
    let keys = manager(Algorithm::EdDsa);
    let key = keys.current_signing_key();
    let now = Utc::now().timestamp();
    let verifier = verifier(&keys, 60);

    let string_exp = sign_raw(
        json!({"alg": "EdDSA", "kid": key.kid()}),
        json!({"sub": "alice", "iss": ISSUER, "iat": now, "exp": "soon", "scope": "read"}),
        &key,
    );
    assert_eq!(
        rejection(verifier.verify(&string_exp).await),
        VerificationFailure::MalformedToken
    );

    let numeric_sub = sign_raw(
        json!({"alg": "EdDSA", "kid": key.kid()}),
        json!({"sub": 42, "iss": ISSUER, "iat": now, "exp": now + 900, "scope": "read"}),
        &key,
    );
    assert_eq!(
        rejection(verifier.verify(&numeric_sub).await),
        VerificationFailure::MalformedToken
    );
}

#[tokio::test]
async fn test_garbage_is_malformed() {
    let keys = manager(Algorithm::EdDsa);
    let verifier = verifier(&keys, 60);

    for token in ["", "not-a-token", "a.b.c", "eyJhbGciOiJFZERTQSJ9.e30.c2ln"] {
        assert_eq!(
            rejection(verifier.verify(token).await),
            VerificationFailure::MalformedToken,
            "token {:?}",
            token
        );
    }
}
