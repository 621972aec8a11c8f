use actix_web::{web, HttpResponse};

use kg_core::repositories::{ClientRepository, ResourceOwnerRepository};

use crate::app::AppState;

/// Handler for GET /health
pub async fn health_check<C, O>(state: web::Data<AppState<C, O>>) -> HttpResponse
where
    C: ClientRepository + 'static,
    O: ResourceOwnerRepository + 'static,
{
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "keygate",
        "version": env!("CARGO_PKG_VERSION"),
        "key_set_version": state.publication.version(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
