use actix_web::http::header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH};
use actix_web::{web, HttpRequest, HttpResponse};

use kg_core::repositories::{ClientRepository, ResourceOwnerRepository};
use kg_core::services::publication::JwkSet;

use crate::app::AppState;

/// Handler for GET /.well-known/jwks.json
///
/// The `ETag` is a digest of the published keys, so a client revalidating
/// with `If-None-Match` gets `304 Not Modified` exactly while the document is
/// unchanged, across restarts and replicas alike.
pub async fn jwks<C, O>(req: HttpRequest, state: web::Data<AppState<C, O>>) -> HttpResponse
where
    C: ClientRepository + 'static,
    O: ResourceOwnerRepository + 'static,
{
    let set = state.publication.get_key_set();
    let etag = format!("\"{}\"", set.fingerprint());
    let cache_control = format!("public, max-age={}", state.jwks_max_age);

    if matches_etag(&req, &etag) {
        return HttpResponse::NotModified()
            .insert_header((ETAG, etag))
            .insert_header((CACHE_CONTROL, cache_control))
            .finish();
    }

    log::debug!("Serving JWKS version {} with {} keys", set.version(), set.len());
    HttpResponse::Ok()
        .insert_header((ETAG, etag))
        .insert_header((CACHE_CONTROL, cache_control))
        .json(JwkSet::from_key_set(&set))
}

/// Whether `If-None-Match` names `etag` (weak comparison)
fn matches_etag(req: &HttpRequest, etag: &str) -> bool {
    let Some(value) = req.headers().get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    value.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}
