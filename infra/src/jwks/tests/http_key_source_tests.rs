use std::sync::Arc;
use std::time::Duration;

use kg_core::domain::entities::Algorithm;
use kg_core::errors::KeyFetchError;
use kg_core::services::keys::{KeyManager, KeyManagerConfig};
use kg_core::services::publication::{KeyPublicationService, KeySource};
use kg_shared::config::VerifierConfig;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::jwks::HttpKeySource;
use crate::InfrastructureError;

async fn serve(body: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(body)
        .mount(&server)
        .await;
    server
}

fn source(server: &MockServer, timeout: Duration) -> HttpKeySource {
    HttpKeySource::new(format!("{}/.well-known/jwks.json", server.uri()), timeout).unwrap()
}

#[tokio::test]
async fn test_fetches_published_keys() {
    let keys = Arc::new(KeyManager::new(KeyManagerConfig::new(Algorithm::EdDsa)).unwrap());
    let publication = KeyPublicationService::new(keys.clone());
    let server = serve(ResponseTemplate::new(200).set_body_json(publication.jwks())).await;

    let source = source(&server, Duration::from_secs(5));
    let set = source.fetch_key_set().await.unwrap();

    let current = keys.current_signing_key();
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.find(current.kid()).unwrap().material,
        current.verification_key().material
    );
}

#[tokio::test]
async fn test_versions_increase_per_fetch() {
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({"keys": []}))).await;
    let source = source(&server, Duration::from_secs(5));

    let first = source.fetch_key_set().await.unwrap();
    let second = source.fetch_key_set().await.unwrap();
    assert!(second.version() > first.version());
    assert!(first.is_empty());
}

#[tokio::test]
async fn test_skips_unusable_keys() {
    let body = json!({
        "keys": [
            {"kty": "OKP", "crv": "Ed25519", "kid": "ed-1", "use": "sig", "alg": "EdDSA",
             "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"},
            {"kty": "OKP", "crv": "Ed25519", "kid": "enc-1", "use": "enc",
             "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"},
            {"kty": "EC", "crv": "P-256", "kid": "ec-1", "use": "sig"}
        ]
    });
    let server = serve(ResponseTemplate::new(200).set_body_json(body)).await;

    let set = source(&server, Duration::from_secs(5)).fetch_key_set().await.unwrap();
    assert_eq!(set.kids(), vec!["ed-1"]);
}

#[tokio::test]
async fn test_error_status() {
    let server = serve(ResponseTemplate::new(503)).await;

    let result = source(&server, Duration::from_secs(5)).fetch_key_set().await;
    assert_eq!(result.unwrap_err(), KeyFetchError::Status { status: 503 });
}

#[tokio::test]
async fn test_invalid_document() {
    let server = serve(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let result = source(&server, Duration::from_secs(5)).fetch_key_set().await;
    assert!(matches!(result, Err(KeyFetchError::Decode { .. })));
}

#[tokio::test]
async fn test_duplicate_kid_is_rejected() {
    let key = json!({"kty": "OKP", "crv": "Ed25519", "kid": "ed-1",
                     "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"});
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({"keys": [key, key]}))).await;

    let result = source(&server, Duration::from_secs(5)).fetch_key_set().await;
    assert!(matches!(result, Err(KeyFetchError::Decode { .. })));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_json(json!({"keys": []}))
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let result = source(&server, Duration::from_millis(200)).fetch_key_set().await;
    assert_eq!(result.unwrap_err(), KeyFetchError::Timeout);
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let source = HttpKeySource::new("http://127.0.0.1:1/jwks.json", Duration::from_secs(2)).unwrap();

    let result = source.fetch_key_set().await;
    assert!(matches!(result, Err(KeyFetchError::Transport { .. })));
}

#[test]
fn test_from_config_requires_url() {
    let result = HttpKeySource::from_config(&VerifierConfig::default());
    assert!(matches!(result, Err(InfrastructureError::Config(_))));

    let config = VerifierConfig {
        jwks_url: Some("https://auth.example.com/.well-known/jwks.json".to_string()),
        ..VerifierConfig::default()
    };
    let source = HttpKeySource::from_config(&config).unwrap();
    assert_eq!(source.url(), "https://auth.example.com/.well-known/jwks.json");
}
