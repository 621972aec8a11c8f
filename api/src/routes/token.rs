use actix_web::http::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use actix_web::{web, HttpRequest, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use validator::Validate;

use kg_core::errors::{AuthError, DomainError};
use kg_core::repositories::{ClientRepository, ResourceOwnerRepository};
use kg_core::services::token::{ClientCredentials, Grant, GrantType};

use crate::app::AppState;
use crate::dto::TokenRequest;
use crate::handlers::ApiError;

/// Handler for POST /oauth/token
///
/// Clients authenticate with HTTP Basic or with `client_id` /
/// `client_secret` form parameters, never both.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJhbGciOiJSUzI1NiIs...",
///     "token_type": "Bearer",
///     "expires_in": 900,
///     "scope": "read write"
/// }
/// ```
///
/// ## Errors
/// `invalid_client` (401), `invalid_request` / `invalid_scope` /
/// `unsupported_grant_type` (400), `server_error` (500)
pub async fn token<C, O>(
    req: HttpRequest,
    state: web::Data<AppState<C, O>>,
    form: web::Form<TokenRequest>,
) -> Result<HttpResponse, ApiError>
where
    C: ClientRepository + 'static,
    O: ResourceOwnerRepository + 'static,
{
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        log::warn!("Token request failed validation: {}", errors);
        return Err(ApiError::invalid_request(format!("Invalid parameters: {}", errors)));
    }

    let credentials = client_credentials(&req, &form)?;

    let grant_type: GrantType = form
        .grant_type
        .as_deref()
        .ok_or_else(|| ApiError::invalid_request("grant_type is required"))?
        .parse()
        .map_err(DomainError::from)?;

    let grant = match grant_type {
        GrantType::ClientCredentials => Grant::ClientCredentials {
            subject: form.subject,
        },
        GrantType::Password => Grant::Password {
            username: required(form.username, "username")?,
            password: required(form.password, "password")?,
        },
    };

    log::debug!(
        "Token request from client {} using {}",
        credentials.client_id,
        grant_type
    );

    let issued = state
        .issuer
        .issue(&credentials, grant, form.scope.as_deref())
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, "no-store"))
        .insert_header((PRAGMA, "no-cache"))
        .json(issued))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::invalid_request(format!("{} is required", name)))
}

fn invalid_client() -> ApiError {
    ApiError::Domain(AuthError::InvalidCredentials.into())
}

/// Client credentials from HTTP Basic or the form body
fn client_credentials(req: &HttpRequest, form: &TokenRequest) -> Result<ClientCredentials, ApiError> {
    match (basic_credentials(req)?, &form.client_id) {
        (Some(_), Some(_)) => Err(ApiError::invalid_request(
            "Client authenticated with more than one method",
        )),
        (Some(credentials), None) => Ok(credentials),
        (None, Some(client_id)) => Ok(ClientCredentials::new(
            client_id.clone(),
            form.client_secret.clone().unwrap_or_default(),
        )),
        (None, None) => Err(invalid_client()),
    }
}

fn basic_credentials(req: &HttpRequest) -> Result<Option<ClientCredentials>, ApiError> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| invalid_client())?;
    let (scheme, encoded) = value.split_once(' ').ok_or_else(invalid_client)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(invalid_client());
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(invalid_client)?;
    let (client_id, secret) = decoded.split_once(':').ok_or_else(invalid_client)?;

    Ok(Some(ClientCredentials::new(client_id, secret)))
}
