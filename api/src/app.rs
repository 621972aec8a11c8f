//! Application state and factory
//!
//! This module holds the shared services and provides the factory for
//! creating the Actix-web application.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::{middleware::Logger, web, App, HttpResponse};

use kg_core::repositories::{ClientRepository, ResourceOwnerRepository};
use kg_core::services::keys::KeyManager;
use kg_core::services::publication::KeyPublicationService;
use kg_core::services::token::TokenIssuer;
use kg_core::services::verification::TokenVerifier;
use kg_shared::{error_codes, OAuthErrorResponse};

use crate::handlers::ApiError;
use crate::middleware::BearerAuth;
use crate::routes::{
    admin::rotate_key, health::health_check, jwks::jwks, resources::me, token::token, READ_SCOPE,
    ROTATE_KEYS_SCOPE,
};

/// Services shared by all workers
pub struct AppState<C, O>
where
    C: ClientRepository,
    O: ResourceOwnerRepository,
{
    pub issuer: Arc<TokenIssuer<C, O>>,
    pub keys: Arc<KeyManager>,
    pub publication: Arc<KeyPublicationService>,
    pub verifier: Arc<TokenVerifier>,
    /// `max-age` advertised on the JWKS document, in seconds
    pub jwks_max_age: u64,
}

/// Create and configure the application with all dependencies
pub fn create_app<C, O>(
    app_state: web::Data<AppState<C, O>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    C: ClientRepository + 'static,
    O: ResourceOwnerRepository + 'static,
{
    let verifier = app_state.verifier.clone();

    App::new()
        .app_data(app_state)
        // Malformed token requests answer in the OAuth2 error format
        .app_data(web::FormConfig::default().error_handler(|err, _req| {
            ApiError::invalid_request(err.to_string()).into()
        }))
        .wrap(Logger::default())
        .route("/health", web::get().to(health_check::<C, O>))
        .route("/.well-known/jwks.json", web::get().to(jwks::<C, O>))
        .route("/oauth/token", web::post().to(token::<C, O>))
        .service(
            web::scope("/api/v1")
                .wrap(BearerAuth::new(verifier.clone()).require_scope(READ_SCOPE))
                .route("/me", web::get().to(me)),
        )
        .service(
            web::scope("/admin")
                .wrap(BearerAuth::new(verifier).require_scope(ROTATE_KEYS_SCOPE))
                .route("/keys/rotate", web::post().to(rotate_key::<C, O>)),
        )
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(OAuthErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
