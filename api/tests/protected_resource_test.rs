//! Bearer-protected routes: GET /api/v1/me and POST /admin/keys/rotate

mod common;

use actix_web::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::{json, Value};

use common::{basic, bearer, state, TestState, CLIENT_ID, CLIENT_SECRET};
use kg_api::create_app;
use kg_core::services::token::{ClientCredentials, Grant};

async fn token_for(state: &web::Data<TestState>, scope: &str) -> String {
    state
        .issuer
        .issue(
            &ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
            Grant::ClientCredentials { subject: None },
            Some(scope),
        )
        .await
        .unwrap()
        .access_token
}

#[actix_web::test]
async fn test_me_returns_principal() {
    let state = state();
    let app = test::init_service(create_app(state.clone())).await;

    // Token obtained through the token endpoint, then presented as a bearer
    let req = test::TestRequest::post()
        .uri("/oauth/token")
        .insert_header((AUTHORIZATION, basic(CLIENT_ID, CLIENT_SECRET)))
        .set_form([
            ("grant_type", "password"),
            ("username", "alice"),
            ("password", "wonderland"),
            ("scope", "read"),
        ])
        .to_request();
    let issued: Value = test::call_and_read_body_json(&app, req).await;
    let token = issued["access_token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, bearer(token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["scopes"], json!(["read"]));
    assert_eq!(body["key_id"], state.keys.current_signing_key().kid());
}

#[actix_web::test]
async fn test_rejections_are_indistinguishable() {
    let state = state();
    let app = test::init_service(create_app(state.clone())).await;
    let token = token_for(&state, "read").await;
    let tampered = format!("{}x", token);

    let mut bodies = Vec::new();
    for header in [None, Some(bearer("garbage")), Some(bearer(&tampered))] {
        let mut req = test::TestRequest::get().uri("/api/v1/me");
        if let Some(header) = header {
            req = req.insert_header((AUTHORIZATION, header));
        }
        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp
            .headers()
            .get(WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("error=\"invalid_token\""));
        bodies.push(test::read_body(resp).await);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[actix_web::test]
async fn test_missing_scope_is_forbidden() {
    let state = state();
    let app = test::init_service(create_app(state.clone())).await;
    let token = token_for(&state, "write").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, bearer(&token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp
        .headers()
        .get(WWW_AUTHENTICATE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("error=\"insufficient_scope\""));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "insufficient_scope");
}

#[actix_web::test]
async fn test_rotation_keeps_old_tokens_valid() {
    let state = state();
    let app = test::init_service(create_app(state.clone())).await;
    let old_kid = state.keys.current_signing_key().kid().to_string();
    let read_token = token_for(&state, "read").await;
    let admin_token = token_for(&state, "keys:rotate").await;

    let req = test::TestRequest::post()
        .uri("/admin/keys/rotate")
        .insert_header((AUTHORIZATION, bearer(&admin_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["previous_kid"], old_kid.as_str());
    assert_eq!(body["kid"], state.keys.current_signing_key().kid());
    assert_ne!(body["kid"], old_kid.as_str());
    assert_eq!(body["algorithm"], "EdDSA");

    // Issued before the rotation, still inside the grace period
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, bearer(&read_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let new_token = token_for(&state, "read").await;
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, bearer(&new_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_rotation_requires_scope_and_valid_algorithm() {
    let state = state();
    let app = test::init_service(create_app(state.clone())).await;

    let read_token = token_for(&state, "read").await;
    let req = test::TestRequest::post()
        .uri("/admin/keys/rotate")
        .insert_header((AUTHORIZATION, bearer(&read_token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let admin_token = token_for(&state, "keys:rotate").await;
    let req = test::TestRequest::post()
        .uri("/admin/keys/rotate")
        .insert_header((AUTHORIZATION, bearer(&admin_token)))
        .set_json(json!({"algorithm": "none"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.keys.retired_count(), 0);
}
