use actix_web::HttpResponse;

use crate::middleware::Authenticated;

/// Handler for GET /api/v1/me
///
/// Returns the principal the bearer token resolved to.
pub async fn me(Authenticated(principal): Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(principal)
}
