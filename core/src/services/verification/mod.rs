//! Token verification
//!
//! This module handles:
//! - Parsing and signature checks for bearer tokens
//! - Claim validation (expiry with clock skew, required claims, issuer)
//! - The key set cache with coalesced refreshes and stale fallback

mod cache;
mod config;
mod verifier;

#[cfg(test)]
mod tests;

pub use cache::KeySetCache;
pub use config::{KeySetCacheConfig, TokenVerifierConfig};
pub use verifier::TokenVerifier;
