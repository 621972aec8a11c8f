use actix_web::{web, HttpResponse};
use validator::Validate;

use kg_core::domain::entities::Algorithm;
use kg_core::errors::DomainError;
use kg_core::repositories::{ClientRepository, ResourceOwnerRepository};

use crate::app::AppState;
use crate::dto::{RotateKeyRequest, RotateKeyResponse};
use crate::handlers::ApiError;
use crate::middleware::Authenticated;

/// Handler for POST /admin/keys/rotate
///
/// Generates a new signing key and retires the current one for the grace
/// period. Key generation runs on the blocking pool.
pub async fn rotate_key<C, O>(
    state: web::Data<AppState<C, O>>,
    Authenticated(principal): Authenticated,
    body: Option<web::Json<RotateKeyRequest>>,
) -> Result<HttpResponse, ApiError>
where
    C: ClientRepository + 'static,
    O: ResourceOwnerRepository + 'static,
{
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    request
        .validate()
        .map_err(|e| ApiError::invalid_request(format!("Invalid parameters: {}", e)))?;

    let algorithm = request
        .algorithm
        .as_deref()
        .map(str::parse::<Algorithm>)
        .transpose()
        .map_err(|e| ApiError::invalid_request(e.to_string()))?;

    let keys = state.keys.clone();
    let previous_kid = keys.current_signing_key().kid().to_string();

    let key = web::block(move || keys.rotate(algorithm))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Key rotation task failed: {}", e),
        })?
        .map_err(DomainError::from)?;

    log::info!(
        "Signing key rotated by {}: {} -> {}",
        principal.subject,
        previous_kid,
        key.kid()
    );

    Ok(HttpResponse::Ok().json(RotateKeyResponse {
        kid: key.kid().to_string(),
        algorithm: key.algorithm().to_string(),
        previous_kid,
    }))
}
