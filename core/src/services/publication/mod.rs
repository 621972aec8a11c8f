//! Key publication
//!
//! Exposes the verification keys as a versioned JWKS document and defines
//! the [`KeySource`] seam verifiers refresh their key sets through.

mod jwks;
mod service;


pub use jwks::{Jwk, JwkSet, KEY_USE_SIGNATURE};
pub use service::{KeyPublicationService, KeySource, LocalKeySource};
