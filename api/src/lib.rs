//! HTTP surface for Keygate
//!
//! Thin actix-web adapter over `kg_core`: the OAuth2 token endpoint, JWKS
//! publication, a bearer-protected example resource and key rotation.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};
