//! Bearer token authentication middleware for protected resources.
//!
//! Extracts the token from the `Authorization` header, verifies it with the
//! shared [`TokenVerifier`] and injects the resulting [`Principal`] into the
//! request. An optional scope requirement turns a valid token without that
//! scope into a `403`.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use kg_core::domain::entities::Principal;
use kg_core::errors::DomainError;
use kg_core::services::verification::TokenVerifier;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use crate::handlers::ApiError;

/// Bearer authentication middleware factory
#[derive(Clone)]
pub struct BearerAuth {
    verifier: Arc<TokenVerifier>,
    required_scope: Option<String>,
}

impl BearerAuth {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            required_scope: None,
        }
    }

    /// Reject authenticated requests whose token lacks `scope`
    pub fn require_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = Some(scope.into());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            required_scope: self.required_scope.clone(),
        }))
    }
}

/// Bearer authentication middleware service
pub struct BearerAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
    required_scope: Option<String>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        let required_scope = self.required_scope.clone();

        Box::pin(async move {
            let principal = match authenticate(&req, &verifier, required_scope).await {
                Ok(principal) => principal,
                Err(error) => {
                    let response = error.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(principal);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Verify the bearer token and check the required scope
async fn authenticate(
    req: &ServiceRequest,
    verifier: &TokenVerifier,
    required_scope: Option<String>,
) -> Result<Principal, ApiError> {
    let Some(token) = extract_bearer_token(req) else {
        log::debug!("No bearer token on {}", req.path());
        return Err(ApiError::InvalidToken);
    };

    let principal = verifier
        .verify(&token)
        .await
        .into_result()
        .map_err(DomainError::from)?;

    if let Some(scope) = required_scope {
        if !principal.has_scope(&scope) {
            log::info!(
                "Principal {} lacks scope {} for {}",
                principal.subject,
                scope,
                req.path()
            );
            return Err(ApiError::InsufficientScope { scope });
        }
    }

    Ok(principal)
}

/// Token from an `Authorization: Bearer <token>` header; the scheme is case-insensitive
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Extractor for the principal injected by [`BearerAuth`]
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| Error::from(ApiError::InvalidToken));

        ready(result)
    }
}
