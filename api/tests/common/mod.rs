//! Shared fixtures for the HTTP surface tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use kg_api::AppState;
use kg_core::domain::entities::{Algorithm, Client, ResourceOwner};
use kg_core::services::keys::{KeyManager, KeyManagerConfig};
use kg_core::services::publication::{KeyPublicationService, LocalKeySource};
use kg_core::services::token::{TokenIssuer, TokenIssuerConfig};
use kg_core::services::verification::{
    KeySetCache, KeySetCacheConfig, TokenVerifier, TokenVerifierConfig,
};
use kg_infra::{InMemoryClientRepository, InMemoryResourceOwnerRepository};

pub type TestState = AppState<InMemoryClientRepository, InMemoryResourceOwnerRepository>;

pub const CLIENT_ID: &str = "svc";
pub const CLIENT_SECRET: &str = "s3cret";
pub const ISSUER: &str = "keygate";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn state() -> web::Data<TestState> {
    let keys = Arc::new(KeyManager::new(KeyManagerConfig::new(Algorithm::EdDsa)).unwrap());

    let clients = Arc::new(InMemoryClientRepository::new([Client::new(
        CLIENT_ID,
        bcrypt::hash(CLIENT_SECRET, 4).unwrap(),
        strings(&["read", "write", "keys:rotate"]),
        strings(&["client_credentials", "password"]),
    )]));
    let owners = Arc::new(InMemoryResourceOwnerRepository::new([ResourceOwner::new(
        "alice",
        bcrypt::hash("wonderland", 4).unwrap(),
        strings(&["read"]),
    )]));

    let issuer = Arc::new(TokenIssuer::new(
        clients,
        owners,
        keys.clone(),
        TokenIssuerConfig {
            issuer: ISSUER.to_string(),
            credential_hash_cost: 4,
            ..TokenIssuerConfig::default()
        },
    ));

    let cache = KeySetCache::new(
        Arc::new(LocalKeySource::new(keys.clone())),
        KeySetCacheConfig::default(),
    );
    let verifier = Arc::new(TokenVerifier::new(
        Arc::new(cache),
        TokenVerifierConfig::default().with_issuer(ISSUER),
    ));

    web::Data::new(AppState {
        issuer,
        publication: Arc::new(KeyPublicationService::new(keys.clone())),
        keys,
        verifier,
        jwks_max_age: 300,
    })
}

pub fn basic(client_id: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", client_id, secret)))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
