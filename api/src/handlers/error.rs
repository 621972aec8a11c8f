//! Mapping of domain errors to OAuth2 error responses

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use kg_core::errors::{AuthError, DomainError};
use kg_shared::{error_codes, OAuthErrorResponse};

/// Realm advertised in `WWW-Authenticate` challenges
pub const REALM: &str = "keygate";

/// Errors surfaced by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Missing or rejected bearer token; the cause is only logged
    #[error("invalid bearer token")]
    InvalidToken,

    #[error("scope {scope} required")]
    InsufficientScope { scope: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::Auth(AuthError::InvalidCredentials)) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::Auth(_)) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::Verification(_)) | ApiError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InsufficientScope { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponseBuilder::new(self.status_code());
        response.insert_header((header::CACHE_CONTROL, "no-store"));

        match self {
            ApiError::Domain(DomainError::Auth(auth)) => {
                let body = match auth {
                    AuthError::InvalidCredentials => {
                        log::warn!("Client authentication failed");
                        response.insert_header((
                            header::WWW_AUTHENTICATE,
                            format!("Basic realm=\"{}\"", REALM),
                        ));
                        OAuthErrorResponse::new(
                            error_codes::INVALID_CLIENT,
                            "Client authentication failed",
                        )
                    }
                    AuthError::ScopeNotAuthorized { .. } => {
                        OAuthErrorResponse::new(error_codes::INVALID_SCOPE, auth.to_string())
                    }
                    AuthError::UnsupportedGrantType { .. } => {
                        OAuthErrorResponse::new(error_codes::UNSUPPORTED_GRANT_TYPE, auth.to_string())
                    }
                };
                response.json(body)
            }
            ApiError::Domain(DomainError::Verification(failure)) => {
                log::info!("Bearer token rejected: {}", failure);
                invalid_token(response)
            }
            ApiError::InvalidToken => invalid_token(response),
            ApiError::Domain(error) => {
                log::error!("Request failed: {}", error);
                response.json(OAuthErrorResponse::new(
                    error_codes::SERVER_ERROR,
                    "An internal error occurred",
                ))
            }
            ApiError::InsufficientScope { scope } => {
                response.insert_header((
                    header::WWW_AUTHENTICATE,
                    format!(
                        "Bearer realm=\"{}\", error=\"{}\", scope=\"{}\"",
                        REALM,
                        error_codes::INSUFFICIENT_SCOPE,
                        scope
                    ),
                ));
                response.json(OAuthErrorResponse::new(
                    error_codes::INSUFFICIENT_SCOPE,
                    format!("The request requires the {} scope", scope),
                ))
            }
            ApiError::InvalidRequest(message) => response.json(OAuthErrorResponse::new(
                error_codes::INVALID_REQUEST,
                message.clone(),
            )),
        }
    }
}

/// Every verification failure gets the same challenge and body
fn invalid_token(mut response: HttpResponseBuilder) -> HttpResponse {
    response.insert_header((
        header::WWW_AUTHENTICATE,
        format!(
            "Bearer realm=\"{}\", error=\"{}\"",
            REALM,
            error_codes::INVALID_TOKEN
        ),
    ));
    response.json(OAuthErrorResponse::code(error_codes::INVALID_TOKEN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use kg_core::errors::{SigningFailure, VerificationFailure};

    async fn body(error: ApiError) -> serde_json::Value {
        let bytes = to_bytes(error.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_invalid_client_challenge() {
        let error = ApiError::from(DomainError::from(AuthError::InvalidCredentials));
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"keygate\""
        );
        assert_eq!(body(error).await["error"], "invalid_client");
    }

    #[actix_web::test]
    async fn test_verification_failures_are_indistinguishable() {
        let expired = body(DomainError::from(VerificationFailure::ExpiredToken).into()).await;
        let forged = body(DomainError::from(VerificationFailure::BadSignature).into()).await;
        let missing = body(ApiError::InvalidToken).await;

        assert_eq!(expired, serde_json::json!({"error": "invalid_token"}));
        assert_eq!(expired, forged);
        assert_eq!(expired, missing);
    }

    #[actix_web::test]
    async fn test_status_codes() {
        let cases = [
            (
                ApiError::from(DomainError::from(AuthError::ScopeNotAuthorized {
                    scope: "admin".to_string(),
                })),
                StatusCode::BAD_REQUEST,
                "invalid_scope",
            ),
            (
                ApiError::from(DomainError::from(AuthError::UnsupportedGrantType {
                    grant_type: "implicit".to_string(),
                })),
                StatusCode::BAD_REQUEST,
                "unsupported_grant_type",
            ),
            (
                ApiError::from(DomainError::from(SigningFailure::Crypto {
                    message: "boom".to_string(),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
            ),
            (
                ApiError::InsufficientScope {
                    scope: "read".to_string(),
                },
                StatusCode::FORBIDDEN,
                "insufficient_scope",
            ),
            (
                ApiError::invalid_request("grant_type is required"),
                StatusCode::BAD_REQUEST,
                "invalid_request",
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(body(error).await["error"], code);
        }
    }
}
